/// JWT token issuance and validation
///
/// Tokens are signed with HS256 and carry the caller's identity plus one
/// `account_permission` entry per account the user could access when the
/// token was issued.
///
/// # Claims
///
/// | claim                | meaning                                   |
/// |----------------------|-------------------------------------------|
/// | `sub`                | user id                                   |
/// | `email`              | user email                                |
/// | `jti`                | unique token id                           |
/// | `account_permission` | permitted account ids at issuance time    |
/// | `iss` / `aud`        | configured issuer and audience            |
/// | `iat` / `nbf` / `exp`| issued-at, not-before, expiry (unix secs) |
///
/// The permission claims describe the user at login time only. Authorization
/// decisions re-read the permission table (see [`super::authorization`]).
///
/// # Example
///
/// ```
/// use assetgaze_shared::auth::jwt::{create_token, validate_token, Claims, TokenSettings};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = TokenSettings::new("test-secret-key-at-least-32-bytes-long");
/// let account_id = Uuid::new_v4();
///
/// let claims = Claims::new(Uuid::new_v4(), "user@example.com", vec![account_id], &settings);
/// let token = create_token(&claims, &settings)?;
///
/// let validated = validate_token(&token, &settings)?;
/// assert_eq!(validated.account_permission, vec![account_id]);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token issuer
pub const DEFAULT_ISSUER: &str = "assetgaze";

/// Default token audience
pub const DEFAULT_AUDIENCE: &str = "assetgaze-frontend";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer does not match the configured issuer
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Audience does not match the configured audience
    #[error("Invalid audience")]
    InvalidAudience,
}

/// Signing key and claim settings shared by issuance and validation
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// HMAC secret (at least 32 bytes in production)
    pub secret: String,

    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,

    /// Token lifetime
    pub expires_in: Duration,
}

impl TokenSettings {
    /// Creates settings with the default issuer, audience and a 1 hour lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            expires_in: Duration::hours(1),
        }
    }

    /// Overrides issuer and audience
    pub fn with_issuer_and_audience(
        mut self,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    /// Overrides the token lifetime
    pub fn with_expiration(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// User email
    pub email: String,

    /// Unique token ID
    pub jti: Uuid,

    /// Accounts the user was permitted to at issuance time
    #[serde(default)]
    pub account_permission: Vec<Uuid>,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring after `settings.expires_in`
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        account_ids: Vec<Uuid>,
        settings: &TokenSettings,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + settings.expires_in;

        Self {
            sub: user_id,
            email: email.into(),
            jti: Uuid::new_v4(),
            account_permission: account_ids,
            iss: settings.issuer.clone(),
            aud: settings.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, settings: &TokenSettings) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(settings.secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, `exp`, `nbf`, issuer and audience.
///
/// # Errors
///
/// - `JwtError::Expired` when `exp` has passed
/// - `JwtError::InvalidIssuer` / `JwtError::InvalidAudience` on a mismatch
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_token(token: &str, settings: &TokenSettings) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(settings.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidAudience,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
