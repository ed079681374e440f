/// Transaction CRUD scoped to the caller's permitted accounts
///
/// Every operation reloads the caller's grants before touching a record, and
/// writes must name an existing broker.
/// Reads of a foreign transaction report `NotFound` so the existence of other
/// users' records is not revealed; writes to a foreign account fail with
/// `AccessDenied`.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::PermittedAccounts;
use crate::models::transaction::{Transaction, TransactionFields};
use crate::repository::{BrokerRepository, PermissionRepository, Repositories, TransactionRepository};

#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    permissions: Arc<dyn PermissionRepository>,
    brokers: Arc<dyn BrokerRepository>,
}

impl TransactionService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            transactions: repos.transactions.clone(),
            permissions: repos.permissions.clone(),
            brokers: repos.brokers.clone(),
        }
    }

    async fn require_broker(&self, broker_id: Uuid) -> ServiceResult<()> {
        match self.brokers.find_by_id(broker_id).await? {
            Some(_) => Ok(()),
            None => {
                debug!(broker_id = %broker_id, "Transaction names an unknown broker");
                Err(ServiceError::UnknownBroker(broker_id))
            }
        }
    }

    async fn permitted(&self, user_id: Uuid) -> ServiceResult<PermittedAccounts> {
        Ok(PermittedAccounts::load(self.permissions.as_ref(), user_id).await?)
    }

    /// Records a new transaction; nothing is persisted on `AccessDenied`
    pub async fn create(&self, fields: TransactionFields, user_id: Uuid) -> ServiceResult<Transaction> {
        self.permitted(user_id).await?.require(fields.account_id)?;
        self.require_broker(fields.broker_id).await?;

        let tx = self.transactions.create(&Transaction::from_fields(fields)).await?;

        info!(
            user_id = %user_id,
            transaction_id = %tx.id,
            account_id = %tx.account_id,
            "Transaction created"
        );

        Ok(tx)
    }

    /// Fetches a transaction the caller may see
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> ServiceResult<Transaction> {
        let tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Transaction"))?;

        if !self.permitted(user_id).await?.contains(tx.account_id) {
            debug!(user_id = %user_id, transaction_id = %id, "Transaction hidden from caller");
            return Err(ServiceError::NotFound("Transaction"));
        }

        Ok(tx)
    }

    /// Overwrites every mutable field of a transaction
    ///
    /// The caller needs access to the current account and, when the update
    /// moves the transaction, to the target account as well.
    pub async fn update(
        &self,
        id: Uuid,
        fields: TransactionFields,
        user_id: Uuid,
    ) -> ServiceResult<Transaction> {
        let mut tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Transaction"))?;

        let permitted = self.permitted(user_id).await?;
        permitted.require(tx.account_id)?;
        if fields.account_id != tx.account_id {
            permitted.require(fields.account_id)?;
        }
        self.require_broker(fields.broker_id).await?;

        tx.apply(fields);

        if !self.transactions.update(&tx).await? {
            return Err(ServiceError::NotFound("Transaction"));
        }

        info!(user_id = %user_id, transaction_id = %id, "Transaction updated");

        Ok(tx)
    }

    /// Removes a transaction
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let tx = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Transaction"))?;

        self.permitted(user_id).await?.require(tx.account_id)?;

        if !self.transactions.delete(id).await? {
            return Err(ServiceError::NotFound("Transaction"));
        }

        info!(user_id = %user_id, transaction_id = %id, "Transaction deleted");

        Ok(())
    }

    /// Every transaction in the caller's permitted accounts, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<Transaction>> {
        let permitted = self.permitted(user_id).await?;

        if permitted.is_empty() {
            debug!(user_id = %user_id, "No permitted accounts");
            return Ok(Vec::new());
        }

        Ok(self.transactions.find_by_account_ids(&permitted.ids()).await?)
    }
}
