/// Broker endpoints
///
/// - `POST /api/brokers` - Create a broker
/// - `GET /api/brokers` - List all brokers
/// - `GET /api/brokers/:id` - Fetch one broker

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use assetgaze_shared::models::broker::Broker;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrokerRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

pub async fn create_broker(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateBrokerRequest>,
) -> ApiResult<(StatusCode, Json<Broker>)> {
    req.validate().map_err(|e| ApiError::from_validation(&e))?;

    let broker = state.broker_service().create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(broker)))
}

pub async fn list_brokers(State(state): State<AppState>) -> ApiResult<Json<Vec<Broker>>> {
    Ok(Json(state.broker_service().list().await?))
}

pub async fn get_broker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Broker>> {
    Ok(Json(state.broker_service().get(id).await?))
}
