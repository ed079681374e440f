/// User model, lockout bookkeeping and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     failed_login_attempts INTEGER NOT NULL DEFAULT 0,
///     lockout_end TIMESTAMPTZ,
///     login_count INTEGER NOT NULL DEFAULT 0,
///     last_login_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Lockout
///
/// Every failed password check increments `failed_login_attempts`. Reaching
/// [`MAX_FAILED_LOGIN_ATTEMPTS`] sets `lockout_end` to
/// [`LOCKOUT_DURATION_MINUTES`] in the future. A successful login clears both.
/// Both transitions run as one `UPDATE` so concurrent attempts cannot lose
/// increments.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Consecutive failures that trigger a lockout
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 5;

/// Length of the lockout window
pub const LOCKOUT_DURATION_MINUTES: i64 = 15;

/// User model representing a registered user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (unique, case-insensitive)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Consecutive failed password checks
    pub failed_login_attempts: i32,

    /// Logins are refused until this instant
    pub lockout_end: Option<DateTime<Utc>>,

    /// Number of successful logins
    pub login_count: i32,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the user registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a freshly registered user with zeroed counters
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            failed_login_attempts: 0,
            lockout_end: None,
            login_count: 0,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether logins are currently refused
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_end, Some(end) if end > now)
    }

    /// Records a failed password check, returning true if it started a lockout
    ///
    /// A lockout that is already running is not extended.
    pub fn record_failed_login(&mut self, now: DateTime<Utc>) -> bool {
        self.failed_login_attempts += 1;

        if self.failed_login_attempts >= MAX_FAILED_LOGIN_ATTEMPTS && !self.is_locked_out(now) {
            self.lockout_end = Some(now + Duration::minutes(LOCKOUT_DURATION_MINUTES));
            return true;
        }

        false
    }

    /// Records a successful login
    pub fn record_successful_login(&mut self, now: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.lockout_end = None;
        self.login_count += 1;
        self.last_login_at = Some(now);
    }

    /// Inserts a user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` if the email exists
    /// in any letter case.
    pub async fn create(pool: &PgPool, user: &User) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, failed_login_attempts, lockout_end,
                               login_count, last_login_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email::text AS email, password_hash, failed_login_attempts, lockout_end,
                      login_count, last_login_at, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.failed_login_attempts)
        .bind(user.lockout_end)
        .bind(user.login_count)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email::text AS email, password_hash, failed_login_attempts, lockout_end,
                   login_count, last_login_at, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Lookup is case-insensitive via the CITEXT column type.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email::text AS email, password_hash, failed_login_attempts, lockout_end,
                   login_count, last_login_at, created_at
            FROM users
            WHERE email = $1::citext
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Counts a failed password check in a single statement
    ///
    /// The increment happens in the database so concurrent failures cannot
    /// overwrite each other. Reaching the limit starts a lockout unless one
    /// is already running. Returns the updated row, or None if the user
    /// doesn't exist.
    pub async fn increment_failed_logins(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET failed_login_attempts = failed_login_attempts + 1,
                lockout_end = CASE
                    WHEN failed_login_attempts + 1 >= $3
                         AND (lockout_end IS NULL OR lockout_end <= $2)
                    THEN $4
                    ELSE lockout_end
                END
            WHERE id = $1
            RETURNING id, email::text AS email, password_hash, failed_login_attempts, lockout_end,
                      login_count, last_login_at, created_at
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(MAX_FAILED_LOGIN_ATTEMPTS)
        .bind(now + Duration::minutes(LOCKOUT_DURATION_MINUTES))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Resets the failure counter and counts a login in a single statement
    ///
    /// Matches nothing while a lockout is running, so a lockout set by a
    /// concurrent attempt still wins. Returns None if the user is locked or
    /// doesn't exist.
    pub async fn complete_login(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET failed_login_attempts = 0,
                lockout_end = NULL,
                login_count = login_count + 1,
                last_login_at = $2
            WHERE id = $1
              AND (lockout_end IS NULL OR lockout_end <= $2)
            RETURNING id, email::text AS email, password_hash, failed_login_attempts, lockout_end,
                      login_count, last_login_at, created_at
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
