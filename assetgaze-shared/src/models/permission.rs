/// User-to-account permission model and database operations
///
/// A permission row is the authorization boundary for every transaction
/// operation: a user may read or modify a transaction only if a row links
/// them to the transaction's account.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_account_permissions (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, account_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use assetgaze_shared::models::permission::UserAccountPermission;
/// use assetgaze_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let (user_id, account_id) = (Uuid::new_v4(), Uuid::new_v4());
///
/// UserAccountPermission::grant(&pool, user_id, account_id).await?;
/// let accounts = UserAccountPermission::account_ids_for_user(&pool, user_id).await?;
/// assert!(accounts.contains(&account_id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Grant linking a user to an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserAccountPermission {
    /// User ID
    pub user_id: Uuid,

    /// Account ID
    pub account_id: Uuid,

    /// When the grant was created
    pub created_at: DateTime<Utc>,
}

impl UserAccountPermission {
    /// Grants a user access to an account
    ///
    /// Granting an existing pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the user or account doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn grant(pool: &PgPool, user_id: Uuid, account_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_account_permissions (user_id, account_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, account_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Revokes a grant
    ///
    /// Returns true if a grant was removed.
    pub async fn revoke(pool: &PgPool, user_id: Uuid, account_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_account_permissions
            WHERE user_id = $1 AND account_id = $2
            "#,
        )
        .bind(user_id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns every account ID the user is permitted to
    pub async fn account_ids_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT account_id
            FROM user_account_permissions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
