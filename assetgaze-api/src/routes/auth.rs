/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a bearer token
/// - `GET /api/auth/status` - Confirm the token is valid (authenticated)
/// - `POST /api/auth/logout` - Acknowledge logout (authenticated)
///
/// Tokens are stateless: logout only tells the client to discard its token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use assetgaze_shared::auth::middleware::AuthContext;
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Returned for a duplicate email and for malformed input alike
pub const REGISTRATION_FAILED: &str =
    "Registration failed. An account with this email may already exist.";

/// Returned for unknown email, wrong password and locked accounts alike
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_authenticated: bool,
    pub message: String,
    pub user_id: Uuid,
    pub email: String,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "SecureP@ss123" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed body, invalid input or email already
///   registered (same message)
/// - `500 Internal Server Error`: storage or hashing failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Registration body rejected");
        ApiError::BadRequest(REGISTRATION_FAILED.to_string())
    })?;

    if let Err(e) = req.validate() {
        tracing::debug!(errors = %e, "Registration input rejected");
        return Err(ApiError::BadRequest(REGISTRATION_FAILED.to_string()));
    }

    if !state.auth_service().register(&req.email, &req.password).await? {
        return Err(ApiError::BadRequest(REGISTRATION_FAILED.to_string()));
    }

    Ok(Json(MessageResponse {
        message: "User registered successfully.".to_string(),
    }))
}

/// Login and receive a bearer token
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "SecureP@ss123" }
/// ```
///
/// Response: `{ "token": "eyJ..." }`
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email, wrong password or locked account
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.auth_service().login(&req.email, &req.password).await? {
        Some(token) => Ok(Json(LoginResponse { token })),
        None => Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())),
    }
}

/// Confirms the caller's token is valid
pub async fn status(Extension(auth): Extension<AuthContext>) -> Json<StatusResponse> {
    Json(StatusResponse {
        is_authenticated: true,
        message: "User is authenticated.".to_string(),
        user_id: auth.user_id,
        email: auth.email,
    })
}

/// Stateless logout
pub async fn logout(Extension(auth): Extension<AuthContext>) -> Json<MessageResponse> {
    tracing::info!(user_id = %auth.user_id, "User logged out");

    Json(MessageResponse {
        message: "Logged out successfully.".to_string(),
    })
}
