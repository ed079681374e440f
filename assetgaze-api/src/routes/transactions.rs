/// Transaction endpoints
///
/// All routes require authentication. Access is scoped to the accounts the
/// caller currently holds grants for.
///
/// # Endpoints
///
/// - `POST /api/transactions` - Record a transaction (201 + `Location`)
/// - `GET /api/transactions/user` - List the caller's transactions
/// - `GET /api/transactions/:id` - Fetch one (404 if absent or not visible)
/// - `PUT /api/transactions/:id` - Overwrite one (403 / 404)
/// - `DELETE /api/transactions/:id` - Remove one (204, 403 / 404)
///
/// # Request body (create and update)
///
/// ```json
/// {
///   "transactionType": "Buy",
///   "brokerId": "uuid",
///   "accountId": "uuid",
///   "taxWrapper": "ISA",
///   "isin": "GB00B4L5Y983",
///   "transactionDate": "2024-03-01T12:00:00Z",
///   "quantity": "10",
///   "nativePrice": "20.00",
///   "localPrice": "20.00",
///   "consideration": "200.00",
///   "brokerCharge": "9.95",
///   "stampDuty": null,
///   "fxCharge": null,
///   "accruedInterest": null,
///   "brokerDealReference": "REF-001"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use assetgaze_shared::{
    auth::middleware::AuthContext,
    models::transaction::{Transaction, TransactionFields},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<TransactionFields>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(|e| ApiError::from_validation(&e))?;

    let tx = state.transaction_service().create(req, auth.user_id).await?;
    let location = format!("/api/transactions/{}", tx.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(tx)))
}

pub async fn list_user_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let txs = state.transaction_service().list_for_user(auth.user_id).await?;
    Ok(Json(txs))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Transaction>> {
    let tx = state.transaction_service().get(id, auth.user_id).await?;
    Ok(Json(tx))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<TransactionFields>,
) -> ApiResult<Json<Transaction>> {
    req.validate().map_err(|e| ApiError::from_validation(&e))?;

    let tx = state.transaction_service().update(id, req, auth.user_id).await?;
    Ok(Json(tx))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.transaction_service().delete(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
