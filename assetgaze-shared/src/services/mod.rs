/// Business rules over the repositories
///
/// Handlers call services, services call repository traits. Every service
/// holds `Arc<dyn ...>` handles so it is cheap to build per request.
///
/// - `auth`: registration, login, lockout and token issuance
/// - `transactions`: transaction CRUD scoped to the caller's accounts
/// - `accounts`: account creation with self-grant, listing
/// - `brokers`: broker reference data

pub mod accounts;
pub mod auth;
pub mod brokers;
pub mod transactions;

use uuid::Uuid;

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::repository::RepositoryError;

pub use accounts::AccountService;
pub use auth::AuthService;
pub use brokers::BrokerService;
pub use transactions::TransactionService;

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller is not permitted for the account
    #[error("Access denied to account {account_id}")]
    AccessDenied { account_id: Uuid },

    /// Resource doesn't exist (or is hidden from the caller)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request names a broker that doesn't exist
    #[error("Broker {0} does not exist")]
    UnknownBroker(Uuid),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::AccessDenied { account_id, .. } => ServiceError::AccessDenied { account_id },
            AuthzError::Repository(e) => ServiceError::Repository(e),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
