/// PostgreSQL repository implementation
///
/// Thin adapter over the model functions; every call is a single statement
/// against the shared pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AccountRepository, BrokerRepository, PermissionRepository, RepositoryResult,
    TransactionRepository, UserRepository,
};
use crate::models::{
    account::Account,
    broker::Broker,
    permission::UserAccountPermission,
    transaction::Transaction,
    user::User,
};

/// Repository backed by a `PgPool`
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create(&self, user: &User) -> RepositoryResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn record_failed_login(&self, id: Uuid, now: DateTime<Utc>) -> RepositoryResult<Option<User>> {
        Ok(User::increment_failed_logins(&self.pool, id, now).await?)
    }

    async fn record_successful_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Option<User>> {
        Ok(User::complete_login(&self.pool, id, now).await?)
    }
}

#[async_trait]
impl PermissionRepository for PgRepository {
    async fn grant(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<()> {
        Ok(UserAccountPermission::grant(&self.pool, user_id, account_id).await?)
    }

    async fn revoke(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<bool> {
        Ok(UserAccountPermission::revoke(&self.pool, user_id, account_id).await?)
    }

    async fn account_ids_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Uuid>> {
        Ok(UserAccountPermission::account_ids_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl AccountRepository for PgRepository {
    async fn create(&self, account: &Account) -> RepositoryResult<Account> {
        Ok(Account::create(&self.pool, account).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Account>> {
        Ok(Account::find_by_id(&self.pool, id).await?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Account>> {
        Ok(Account::list_by_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl BrokerRepository for PgRepository {
    async fn create(&self, broker: &Broker) -> RepositoryResult<Broker> {
        Ok(Broker::create(&self.pool, broker).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Broker>> {
        Ok(Broker::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Broker>> {
        Ok(Broker::list(&self.pool).await?)
    }
}

#[async_trait]
impl TransactionRepository for PgRepository {
    async fn create(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        Ok(Transaction::create(&self.pool, tx).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>> {
        Ok(Transaction::find_by_id(&self.pool, id).await?)
    }

    async fn update(&self, tx: &Transaction) -> RepositoryResult<bool> {
        Ok(Transaction::update(&self.pool, tx).await?)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(Transaction::delete(&self.pool, id).await?)
    }

    async fn find_by_account_ids(&self, account_ids: &[Uuid]) -> RepositoryResult<Vec<Transaction>> {
        Ok(Transaction::find_by_account_ids(&self.pool, account_ids).await?)
    }
}
