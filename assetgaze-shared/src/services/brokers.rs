/// Broker reference data

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::broker::Broker;
use crate::repository::{BrokerRepository, Repositories};

#[derive(Clone)]
pub struct BrokerService {
    brokers: Arc<dyn BrokerRepository>,
}

impl BrokerService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            brokers: repos.brokers.clone(),
        }
    }

    pub async fn create(&self, name: &str) -> ServiceResult<Broker> {
        let broker = self.brokers.create(&Broker::new(name.trim())).await?;
        info!(broker_id = %broker.id, name = %broker.name, "Broker created");
        Ok(broker)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Broker> {
        self.brokers
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Broker"))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Broker>> {
        Ok(self.brokers.list().await?)
    }
}
