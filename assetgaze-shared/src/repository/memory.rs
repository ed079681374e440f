/// In-memory repository implementation
///
/// Used by the test suites and by `STORAGE=memory` for local development.
/// Mirrors the PostgreSQL constraints that the services rely on: emails are
/// unique case-insensitively (lowercased like `CITEXT`), transactions must
/// reference an existing broker, and permission grants are idempotent.
/// Login bookkeeping happens under a single write lock.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountRepository, BrokerRepository, PermissionRepository, RepositoryError, RepositoryResult,
    TransactionRepository, UserRepository,
};
use crate::models::{
    account::Account,
    broker::Broker,
    transaction::Transaction,
    user::User,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    accounts: HashMap<Uuid, Account>,
    brokers: HashMap<Uuid, Broker>,
    transactions: HashMap<Uuid, Transaction>,
    /// (user_id, account_id) pairs in grant order
    permissions: Vec<(Uuid, Uuid)>,
}

impl MemoryState {
    fn require_broker(&self, broker_id: Uuid) -> RepositoryResult<()> {
        if self.brokers.contains_key(&broker_id) {
            Ok(())
        } else {
            Err(RepositoryError::MissingReference(format!(
                "broker {} does not exist (transactions_broker_id_fkey)",
                broker_id
            )))
        }
    }
}

/// Repository holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }

    pub async fn permission_count(&self) -> usize {
        self.state.read().await.permissions.len()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, user: &User) -> RepositoryResult<User> {
        let mut state = self.state.write().await;

        let email = user.email.to_lowercase();
        let email_taken = state.users.values().any(|u| u.email.to_lowercase() == email);
        if email_taken {
            return Err(RepositoryError::Conflict(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }

        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn record_failed_login(&self, id: Uuid, now: DateTime<Utc>) -> RepositoryResult<Option<User>> {
        let mut state = self.state.write().await;

        Ok(state.users.get_mut(&id).map(|user| {
            user.record_failed_login(now);
            user.clone()
        }))
    }

    async fn record_successful_login(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Option<User>> {
        let mut state = self.state.write().await;

        match state.users.get_mut(&id) {
            Some(user) if !user.is_locked_out(now) => {
                user.record_successful_login(now);
                Ok(Some(user.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl PermissionRepository for MemoryRepository {
    async fn grant(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;

        if !state.permissions.contains(&(user_id, account_id)) {
            state.permissions.push((user_id, account_id));
        }

        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, account_id: Uuid) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        let before = state.permissions.len();
        state.permissions.retain(|pair| *pair != (user_id, account_id));
        Ok(state.permissions.len() < before)
    }

    async fn account_ids_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .permissions
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, a)| *a)
            .collect())
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn create(&self, account: &Account) -> RepositoryResult<Account> {
        let mut state = self.state.write().await;
        state.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Account>> {
        let state = self.state.read().await;

        let permitted: HashSet<Uuid> = state
            .permissions
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, a)| *a)
            .collect();

        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| permitted.contains(&a.id))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(accounts)
    }
}

#[async_trait]
impl BrokerRepository for MemoryRepository {
    async fn create(&self, broker: &Broker) -> RepositoryResult<Broker> {
        let mut state = self.state.write().await;
        state.brokers.insert(broker.id, broker.clone());
        Ok(broker.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Broker>> {
        Ok(self.state.read().await.brokers.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Broker>> {
        let state = self.state.read().await;
        let mut brokers: Vec<Broker> = state.brokers.values().cloned().collect();
        brokers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brokers)
    }
}

#[async_trait]
impl TransactionRepository for MemoryRepository {
    async fn create(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut state = self.state.write().await;
        state.require_broker(tx.broker_id)?;
        state.transactions.insert(tx.id, tx.clone());
        Ok(tx.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>> {
        Ok(self.state.read().await.transactions.get(&id).cloned())
    }

    async fn update(&self, tx: &Transaction) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        if !state.transactions.contains_key(&tx.id) {
            return Ok(false);
        }
        state.require_broker(tx.broker_id)?;

        match state.transactions.get_mut(&tx.id) {
            Some(stored) => {
                *stored = tx.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.state.write().await.transactions.remove(&id).is_some())
    }

    async fn find_by_account_ids(&self, account_ids: &[Uuid]) -> RepositoryResult<Vec<Transaction>> {
        let state = self.state.read().await;

        let mut txs: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| account_ids.contains(&t.account_id))
            .cloned()
            .collect();
        txs.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_duplicate_email_any_case_conflicts() {
        let repo = MemoryRepository::new();

        UserRepository::create(&repo, &User::new("Test@Example.com", "hash"))
            .await
            .unwrap();
        let second = UserRepository::create(&repo, &User::new("test@example.COM", "hash")).await;

        assert!(matches!(second, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let repo = MemoryRepository::new();
        let user = User::new("mixed@Example.com", "hash");
        UserRepository::create(&repo, &user).await.unwrap();

        let found = repo.find_by_email("MIXED@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_email_matching_folds_non_ascii_case() {
        let repo = MemoryRepository::new();
        let user = User::new("ÉLODIE@example.com", "hash");
        UserRepository::create(&repo, &user).await.unwrap();

        let found = repo.find_by_email("élodie@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let second = UserRepository::create(&repo, &User::new("élodie@EXAMPLE.com", "hash")).await;
        assert!(matches!(second, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failed_logins_are_all_counted() {
        let repo = Arc::new(MemoryRepository::new());
        let user_id = UserRepository::create(repo.as_ref(), &User::new("race@example.com", "hash"))
            .await
            .unwrap()
            .id;
        let now = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.record_failed_login(user_id, now).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.find_by_email("race@example.com").await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 8);
        assert_eq!(stored.lockout_end, Some(now + Duration::minutes(15)));
    }

    #[tokio::test]
    async fn test_successful_login_refused_while_locked() {
        let repo = MemoryRepository::new();
        let user = UserRepository::create(&repo, &User::new("locked@example.com", "hash"))
            .await
            .unwrap();
        let now = Utc::now();

        for _ in 0..5 {
            repo.record_failed_login(user.id, now).await.unwrap();
        }
        assert!(repo.record_successful_login(user.id, now).await.unwrap().is_none());

        let later = now + Duration::minutes(16);
        let user = repo.record_successful_login(user.id, later).await.unwrap().unwrap();
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.login_count, 1);
        assert_eq!(user.last_login_at, Some(later));
    }

    #[tokio::test]
    async fn test_grant_is_idempotent_and_revocable() {
        let repo = MemoryRepository::new();
        let (user_id, account_id) = (Uuid::new_v4(), Uuid::new_v4());

        repo.grant(user_id, account_id).await.unwrap();
        repo.grant(user_id, account_id).await.unwrap();
        assert_eq!(repo.permission_count().await, 1);
        assert_eq!(repo.account_ids_for_user(user_id).await.unwrap(), vec![account_id]);

        assert!(repo.revoke(user_id, account_id).await.unwrap());
        assert!(!repo.revoke(user_id, account_id).await.unwrap());
        assert!(repo.account_ids_for_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_writes_check_row_and_broker() {
        use crate::models::transaction::{TaxWrapper, TransactionFields, TransactionType};
        use chrono::Utc;
        use rust_decimal::Decimal;

        let repo = MemoryRepository::new();
        let broker = BrokerRepository::create(&repo, &Broker::new("AJ Bell")).await.unwrap();
        let mut tx = Transaction::from_fields(TransactionFields {
            transaction_type: TransactionType::Buy,
            broker_id: broker.id,
            account_id: Uuid::new_v4(),
            tax_wrapper: TaxWrapper::Isa,
            isin: "GB00B4L5Y983".to_string(),
            transaction_date: Utc::now(),
            quantity: Decimal::ONE,
            native_price: Decimal::ONE,
            local_price: Decimal::ONE,
            consideration: Decimal::ONE,
            broker_charge: None,
            stamp_duty: None,
            fx_charge: None,
            accrued_interest: None,
            broker_deal_reference: None,
        });

        assert!(!TransactionRepository::update(&repo, &tx).await.unwrap());
        TransactionRepository::create(&repo, &tx).await.unwrap();
        assert!(TransactionRepository::update(&repo, &tx).await.unwrap());

        tx.broker_id = Uuid::new_v4();
        assert!(matches!(
            TransactionRepository::update(&repo, &tx).await,
            Err(RepositoryError::MissingReference(_))
        ));

        assert!(TransactionRepository::delete(&repo, tx.id).await.unwrap());
        assert_eq!(repo.transaction_count().await, 0);

        assert!(matches!(
            TransactionRepository::create(&repo, &tx).await,
            Err(RepositoryError::MissingReference(_))
        ));
        assert_eq!(repo.transaction_count().await, 0);
    }
}
