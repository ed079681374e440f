/// Request authentication for Axum
///
/// Extracts the bearer token from the `Authorization` header, validates it,
/// and produces an [`AuthContext`] that route handlers receive through
/// request extensions.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::Next, response::Response, Extension};
/// use assetgaze_shared::auth::jwt::TokenSettings;
/// use assetgaze_shared::auth::middleware::{authenticate, AuthContext, AuthError};
///
/// async fn jwt_layer(mut req: Request, next: Next) -> Result<Response, AuthError> {
///     let settings = TokenSettings::new("a-secret-that-is-at-least-32-bytes-long");
///     let auth = authenticate(req.headers(), &settings)?;
///     req.extensions_mut().insert(auth);
///     Ok(next.run(req).await)
/// }
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.email)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError, TokenSettings};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID (`sub` claim)
    pub user_id: Uuid,

    /// Email from the token
    pub email: String,

    /// Token ID (`jti` claim)
    pub token_id: Uuid,

    /// Accounts listed in the token at issuance time.
    ///
    /// Informational only: authorization re-reads the permission table.
    pub token_account_ids: Vec<Uuid>,
}

impl AuthContext {
    /// Creates auth context from validated claims
    pub fn from_claims(claims: super::jwt::Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            token_id: claims.jti,
            token_account_ids: claims.account_permission,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Every variant is an unauthenticated request
        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty Bearer token".to_string()));
    }

    Ok(token)
}

/// Validates the request's bearer token and builds the auth context
pub fn authenticate(headers: &HeaderMap, settings: &TokenSettings) -> Result<AuthContext, AuthError> {
    let token = extract_bearer_token(headers)?;

    let claims = validate_token(token, settings).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        JwtError::InvalidAudience => AuthError::InvalidToken("Invalid audience".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(AuthContext::from_claims(claims))
}
