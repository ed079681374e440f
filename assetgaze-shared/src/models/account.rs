/// Account model and database operations
///
/// An account is a portfolio that transactions are recorded against. Access
/// is granted per user through [`super::permission::UserAccountPermission`].

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Investment account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
}

impl Account {
    /// Builds an account with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Inserts an account
    pub async fn create(pool: &PgPool, account: &Account) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, name)
            VALUES ($1, $2)
            RETURNING id, name
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>("SELECT id, name FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    /// Lists the accounts a user holds a permission for, ordered by name
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.name
            FROM accounts a
            INNER JOIN user_account_permissions p ON p.account_id = a.id
            WHERE p.user_id = $1
            ORDER BY a.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }
}
