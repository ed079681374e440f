/// Registration and login
///
/// # Login flow
///
/// 1. Unknown email or active lockout: no token, nothing written. The
///    password is still run through Argon2 so every path costs the same
/// 2. Wrong password: failure counter incremented atomically, lockout set
///    on the fifth consecutive failure, no token
/// 3. Correct password: counters reset, `login_count` incremented, token
///    issued carrying the user's current account grants
///
/// Callers cannot distinguish the three failure cases; all return `None`.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tracing::{info, warn};

use super::ServiceResult;
use crate::auth::jwt::{create_token, Claims, TokenSettings};
use crate::auth::password::{hash_password, verify_password};
use crate::models::user::User;
use crate::repository::{PermissionRepository, Repositories, RepositoryError, UserRepository};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    permissions: Arc<dyn PermissionRepository>,
    tokens: Arc<TokenSettings>,
}

impl AuthService {
    pub fn new(repos: &Repositories, tokens: Arc<TokenSettings>) -> Self {
        Self {
            users: repos.users.clone(),
            permissions: repos.permissions.clone(),
            tokens,
        }
    }

    /// Registers a user
    ///
    /// Returns `Ok(false)` if the email is already registered in any letter
    /// case. The password is stored only as an Argon2id hash.
    pub async fn register(&self, email: &str, password: &str) -> ServiceResult<bool> {
        let email = email.trim();

        if self.users.find_by_email(email).await?.is_some() {
            info!(email = %email, "Registration rejected: email already registered");
            return Ok(false);
        }

        let password_hash = hash_password(password)?;
        let user = User::new(email, password_hash);

        match self.users.create(&user).await {
            Ok(user) => {
                info!(user_id = %user.id, "User registered");
                Ok(true)
            }
            // Lost a race with a concurrent registration
            Err(RepositoryError::Conflict(_)) => {
                info!(email = %email, "Registration rejected: email already registered");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Attempts a login, returning a signed token on success
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<Option<String>> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            // Same Argon2 cost as a real check so timing doesn't reveal the account
            if let Some(hash) = timing_hash() {
                let _ = verify_password(password, hash);
            }
            info!("Login failed: unknown email");
            return Ok(None);
        };

        let now = Utc::now();
        let password_matches = verify_password(password, &user.password_hash)?;

        if user.is_locked_out(now) {
            warn!(user_id = %user.id, lockout_end = ?user.lockout_end, "Login refused: account locked");
            return Ok(None);
        }

        if !password_matches {
            if let Some(updated) = self.users.record_failed_login(user.id, now).await? {
                if updated.is_locked_out(now) {
                    warn!(
                        user_id = %updated.id,
                        failed_attempts = updated.failed_login_attempts,
                        "Account locked after repeated failed logins"
                    );
                } else {
                    info!(user_id = %updated.id, failed_attempts = updated.failed_login_attempts, "Login failed: wrong password");
                }
            }
            return Ok(None);
        }

        let Some(user) = self.users.record_successful_login(user.id, now).await? else {
            warn!(user_id = %user.id, "Login refused: account locked by a concurrent attempt");
            return Ok(None);
        };

        let account_ids = self.permissions.account_ids_for_user(user.id).await?;
        let claims = Claims::new(user.id, user.email.clone(), account_ids, &self.tokens);
        let token = create_token(&claims, &self.tokens)?;

        info!(user_id = %user.id, login_count = user.login_count, "User logged in");

        Ok(Some(token))
    }
}

/// Hash verified against when the email is unknown
fn timing_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();

    HASH.get_or_init(|| hash_password("assetgaze-unknown-user").ok())
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::repository::MemoryRepository;
    use chrono::Duration;
    use uuid::Uuid;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const PASSWORD: &str = "CorrectHorse1!";

    fn service() -> (AuthService, Arc<MemoryRepository>, Arc<TokenSettings>) {
        let store = Arc::new(MemoryRepository::new());
        let tokens = Arc::new(TokenSettings::new(SECRET));
        let service = AuthService::new(&Repositories::from_memory(store.clone()), tokens.clone());
        (service, store, tokens)
    }

    #[tokio::test]
    async fn test_register_twice_any_case_succeeds_once() {
        let (service, store, _) = service();

        assert!(service.register("Alice@Example.com", PASSWORD).await.unwrap());
        assert!(!service.register("alice@example.COM", PASSWORD).await.unwrap());

        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_stores_hash_and_zero_counters() {
        let (service, store, _) = service();
        service.register("bob@example.com", PASSWORD).await.unwrap();

        let user = store.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_ne!(user.password_hash, PASSWORD);
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.login_count, 0);
        assert!(user.lockout_end.is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email_returns_none() {
        let (service, _, _) = service();
        assert!(service.login("ghost@example.com", PASSWORD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_five_failures_lock_account() {
        let (service, store, _) = service();
        service.register("carol@example.com", PASSWORD).await.unwrap();

        for _ in 0..5 {
            assert!(service.login("carol@example.com", "wrong").await.unwrap().is_none());
        }

        let user = store.find_by_email("carol@example.com").await.unwrap().unwrap();
        assert_eq!(user.failed_login_attempts, 5);
        let lockout_end = user.lockout_end.expect("lockout should be set");
        let remaining = lockout_end - Utc::now();
        assert!(remaining > Duration::minutes(14));
        assert!(remaining <= Duration::minutes(15));

        // Correct password is still refused while locked
        assert!(service.login("carol@example.com", PASSWORD).await.unwrap().is_none());
        let user = store.find_by_email("carol@example.com").await.unwrap().unwrap();
        assert_eq!(user.login_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_wrong_passwords_still_lock() {
        let (service, store, _) = service();
        service.register("race@example.com", PASSWORD).await.unwrap();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.login("race@example.com", "wrong").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_none());
        }

        let user = store.find_by_email("race@example.com").await.unwrap().unwrap();
        assert!(user.failed_login_attempts >= 5);
        assert!(user.lockout_end.is_some());
        assert!(service.login("race@example.com", PASSWORD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_hash_check() {
        let (service, _, _) = service();

        assert!(service.login("ghost@example.com", PASSWORD).await.unwrap().is_none());
        assert!(timing_hash().is_some_and(|h| h.starts_with("$argon2id$")));
    }

    #[tokio::test]
    async fn test_successful_login_resets_failures() {
        let (service, store, _) = service();
        service.register("dave@example.com", PASSWORD).await.unwrap();

        for _ in 0..3 {
            service.login("dave@example.com", "wrong").await.unwrap();
        }

        let token = service.login("DAVE@example.com", PASSWORD).await.unwrap();
        assert!(token.is_some());

        let user = store.find_by_email("dave@example.com").await.unwrap().unwrap();
        assert_eq!(user.failed_login_attempts, 0);
        assert!(user.lockout_end.is_none());
        assert_eq!(user.login_count, 1);
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_after_lockout_expires() {
        let (service, store, _) = service();
        service.register("erin@example.com", PASSWORD).await.unwrap();

        let user = store.find_by_email("erin@example.com").await.unwrap().unwrap();
        let long_ago = Utc::now() - Duration::minutes(20);
        for _ in 0..5 {
            store.record_failed_login(user.id, long_ago).await.unwrap();
        }

        assert!(service.login("erin@example.com", PASSWORD).await.unwrap().is_some());

        let user = store.find_by_email("erin@example.com").await.unwrap().unwrap();
        assert_eq!(user.failed_login_attempts, 0);
        assert!(user.lockout_end.is_none());
    }

    #[tokio::test]
    async fn test_token_carries_one_claim_per_permitted_account() {
        let (service, store, tokens) = service();
        service.register("frank@example.com", PASSWORD).await.unwrap();
        let user = store.find_by_email("frank@example.com").await.unwrap().unwrap();

        let accounts = vec![Uuid::new_v4(), Uuid::new_v4()];
        for account_id in &accounts {
            store.grant(user.id, *account_id).await.unwrap();
        }

        let token = service.login("frank@example.com", PASSWORD).await.unwrap().unwrap();
        let claims = validate_token(&token, &tokens).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "frank@example.com");
        assert_eq!(claims.account_permission.len(), 2);
        for account_id in &accounts {
            assert!(claims.account_permission.contains(account_id));
        }
    }
}
