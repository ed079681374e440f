/// Storage abstraction
///
/// Services talk to storage only through the traits in this module, so the
/// same business rules run against PostgreSQL in production and against
/// the in-memory store in tests and local development.
///
/// # Implementations
///
/// - [`postgres::PgRepository`]: delegates to the SQL in [`crate::models`]
/// - [`memory::MemoryRepository`]: `HashMap`s behind a `tokio::sync::RwLock`
///
/// # Example
///
/// ```
/// use assetgaze_shared::repository::Repositories;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repos = Repositories::in_memory();
/// let user = repos.users.find_by_email("nobody@example.com").await?;
/// assert!(user.is_none());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    account::Account,
    broker::Broker,
    transaction::Transaction,
    user::User,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key points at a missing row
    #[error("Missing reference: {0}")]
    MissingReference(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                RepositoryError::MissingReference(db.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. `Conflict` if the email exists in any letter case.
    async fn create(&self, user: &User) -> RepositoryResult<User>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Atomically counts a failed password check, starting a lockout when
    /// the limit is reached. None if the user doesn't exist.
    async fn record_failed_login(&self, id: Uuid, now: DateTime<Utc>) -> RepositoryResult<Option<User>>;

    /// Atomically resets the failure counter and counts a login. None if
    /// the user is locked out at `now` or doesn't exist.
    async fn record_successful_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Option<User>>;
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Grants access; re-granting an existing pair is a no-op
    async fn grant(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<()>;

    async fn revoke(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<bool>;

    async fn account_ids_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Uuid>>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: &Account) -> RepositoryResult<Account>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Account>>;

    async fn list_by_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Account>>;
}

#[async_trait]
pub trait BrokerRepository: Send + Sync {
    async fn create(&self, broker: &Broker) -> RepositoryResult<Broker>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Broker>>;

    async fn list(&self) -> RepositoryResult<Vec<Broker>>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>>;

    /// Overwrites the stored row; false if it no longer exists
    async fn update(&self, tx: &Transaction) -> RepositoryResult<bool>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Newest first
    async fn find_by_account_ids(&self, account_ids: &[Uuid]) -> RepositoryResult<Vec<Transaction>>;
}

/// Bundle of repository handles shared through application state
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub brokers: Arc<dyn BrokerRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        let repo = Arc::new(PgRepository::new(pool));
        Self {
            users: repo.clone(),
            permissions: repo.clone(),
            accounts: repo.clone(),
            brokers: repo.clone(),
            transactions: repo,
        }
    }

    /// Fresh, empty in-memory repositories
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryRepository::new()))
    }

    /// Wraps an existing in-memory store, so tests can inspect it directly
    pub fn from_memory(store: Arc<MemoryRepository>) -> Self {
        Self {
            users: store.clone(),
            permissions: store.clone(),
            accounts: store.clone(),
            brokers: store.clone(),
            transactions: store,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
