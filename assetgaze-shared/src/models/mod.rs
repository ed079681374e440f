/// Database models for Assetgaze
///
/// Each model owns its SQL: the PostgreSQL repository delegates to the
/// associated functions defined here.
///
/// # Models
///
/// - `user`: Credentials, login counters and lockout state
/// - `account`: Investment accounts (portfolios)
/// - `permission`: User-to-account access grants
/// - `broker`: Broker reference data
/// - `transaction`: Buy/sell transactions recorded against an account
///
/// # Example
///
/// ```no_run
/// use assetgaze_shared::models::user::User;
/// use assetgaze_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let user = User::find_by_email(&pool, "USER@example.com").await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod broker;
pub mod permission;
pub mod transaction;
pub mod user;
