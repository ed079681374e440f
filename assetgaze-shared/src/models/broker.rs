/// Broker model and database operations
///
/// Brokers are reference data shared by every user.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Broker that executed a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub id: Uuid,
    pub name: String,
}

impl Broker {
    /// Builds a broker with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Inserts a broker
    pub async fn create(pool: &PgPool, broker: &Broker) -> Result<Self, sqlx::Error> {
        let broker = sqlx::query_as::<_, Broker>(
            r#"
            INSERT INTO brokers (id, name)
            VALUES ($1, $2)
            RETURNING id, name
            "#,
        )
        .bind(broker.id)
        .bind(&broker.name)
        .fetch_one(pool)
        .await?;

        Ok(broker)
    }

    /// Finds a broker by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let broker = sqlx::query_as::<_, Broker>("SELECT id, name FROM brokers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(broker)
    }

    /// Lists all brokers, ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let brokers = sqlx::query_as::<_, Broker>("SELECT id, name FROM brokers ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

        Ok(brokers)
    }
}
