/// Account endpoints
///
/// - `POST /api/accounts` - Create an account; the caller is granted access
/// - `GET /api/accounts` - Accounts the caller may use

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use assetgaze_shared::{auth::middleware::AuthContext, models::account::Account};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    req.validate().map_err(|e| ApiError::from_validation(&e))?;

    let account = state.account_service().create(&req.name, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.account_service().list_for_user(auth.user_id).await?;
    Ok(Json(accounts))
}
