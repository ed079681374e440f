/// Account creation and listing
///
/// Creating an account grants its creator access to it, so the new account
/// is immediately usable for transactions.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::ServiceResult;
use crate::models::account::Account;
use crate::repository::{AccountRepository, PermissionRepository, Repositories};

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl AccountService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            accounts: repos.accounts.clone(),
            permissions: repos.permissions.clone(),
        }
    }

    /// Creates an account and grants the creator access to it
    pub async fn create(&self, name: &str, user_id: Uuid) -> ServiceResult<Account> {
        let account = self.accounts.create(&Account::new(name.trim())).await?;
        self.permissions.grant(user_id, account.id).await?;

        info!(user_id = %user_id, account_id = %account.id, "Account created");

        Ok(account)
    }

    /// Accounts the caller holds a grant for
    pub async fn list_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<Account>> {
        Ok(self.accounts.list_by_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    #[tokio::test]
    async fn test_create_grants_creator() {
        let store = Arc::new(MemoryRepository::new());
        let service = AccountService::new(&Repositories::from_memory(store.clone()));
        let user_id = Uuid::new_v4();

        let account = service.create("  Stocks ISA ", user_id).await.unwrap();

        assert_eq!(account.name, "Stocks ISA");
        assert_eq!(store.account_ids_for_user(user_id).await.unwrap(), vec![account.id]);
    }

    #[tokio::test]
    async fn test_list_only_own_accounts() {
        let store = Arc::new(MemoryRepository::new());
        let service = AccountService::new(&Repositories::from_memory(store));
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        service.create("SIPP", alice).await.unwrap();
        service.create("GIA", alice).await.unwrap();
        service.create("Bob's ISA", bob).await.unwrap();

        let names: Vec<String> = service
            .list_for_user(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["GIA", "SIPP"]);
    }
}
