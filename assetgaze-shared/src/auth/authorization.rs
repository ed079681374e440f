/// Account-level authorization
///
/// A user may act on an account only if a row in `user_account_permissions`
/// links them to it. The permitted set is loaded from the repository on every
/// check. The `account_permission` claims inside a token are never consulted,
/// so revoking a grant takes effect on the very next request.
///
/// # Example
///
/// ```no_run
/// use assetgaze_shared::auth::authorization::PermittedAccounts;
/// use assetgaze_shared::repository::Repositories;
/// use uuid::Uuid;
///
/// # async fn example(repos: Repositories, user_id: Uuid, account_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let permitted = PermittedAccounts::load(repos.permissions.as_ref(), user_id).await?;
/// permitted.require(account_id)?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use uuid::Uuid;

use crate::repository::{PermissionRepository, RepositoryError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller holds no permission for the account
    #[error("Access denied to account {account_id}")]
    AccessDenied { user_id: Uuid, account_id: Uuid },

    /// Permission lookup failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Snapshot of the accounts a user may act on
#[derive(Debug, Clone)]
pub struct PermittedAccounts {
    user_id: Uuid,
    account_ids: HashSet<Uuid>,
}

impl PermittedAccounts {
    /// Loads the current grants for a user
    pub async fn load(
        permissions: &dyn PermissionRepository,
        user_id: Uuid,
    ) -> Result<Self, AuthzError> {
        let account_ids = permissions.account_ids_for_user(user_id).await?;

        Ok(Self {
            user_id,
            account_ids: account_ids.into_iter().collect(),
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn contains(&self, account_id: Uuid) -> bool {
        self.account_ids.contains(&account_id)
    }

    pub fn is_empty(&self) -> bool {
        self.account_ids.is_empty()
    }

    /// Permitted account IDs in no particular order
    pub fn ids(&self) -> Vec<Uuid> {
        self.account_ids.iter().copied().collect()
    }

    /// Fails with `AccessDenied` unless the account is permitted
    pub fn require(&self, account_id: Uuid) -> Result<(), AuthzError> {
        if self.contains(account_id) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                account_id = %account_id,
                "Access to unauthorized account denied"
            );
            Err(AuthzError::AccessDenied {
                user_id: self.user_id,
                account_id,
            })
        }
    }
}
