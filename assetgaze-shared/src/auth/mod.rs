/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token issuance and validation
/// - [`middleware`]: Bearer token extraction and the request `AuthContext`
/// - [`authorization`]: Account-level permission checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations, random salt
/// - **JWT Tokens**: HS256 signing, issuer/audience checks, 1 hour expiry
/// - **Authorization**: Permitted accounts are re-read from storage on every request
///
/// # Example
///
/// ```no_run
/// use assetgaze_shared::auth::password::{hash_password, verify_password};
/// use assetgaze_shared::auth::jwt::{create_token, validate_token, Claims, TokenSettings};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let settings = TokenSettings::new("a-secret-that-is-at-least-32-bytes-long");
/// let claims = Claims::new(Uuid::new_v4(), "user@example.com", vec![], &settings);
/// let token = create_token(&claims, &settings)?;
/// let validated = validate_token(&token, &settings)?;
/// assert_eq!(validated.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
