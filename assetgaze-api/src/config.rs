/// Configuration management for the API server
///
/// Values come from environment variables, with a `.env` file loaded first
/// when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_PRODUCTION`: Enables HSTS and strict headers (default: false)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: http://localhost:4200)
/// - `STORAGE`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres storage)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HMAC signing secret, at least 32 characters (required)
/// - `JWT_ISSUER`: Token issuer (default: assetgaze)
/// - `JWT_AUDIENCE`: Token audience (default: assetgaze-frontend)
/// - `JWT_EXPIRY_MINUTES`: Token lifetime, at most 30 days (default: 60)
/// - `RUST_LOG` / `LOG_FORMAT`: read by the binary's tracing setup
///
/// # Example
///
/// ```no_run
/// use assetgaze_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use assetgaze_shared::auth::jwt::{TokenSettings, DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Upper bound for `JWT_EXPIRY_MINUTES` (30 days)
pub const MAX_JWT_EXPIRY_MINUTES: i64 = 60 * 24 * 30;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Which repository implementation to run against
    pub storage: StorageBackend,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins (`*` = any)
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL (empty with in-memory storage)
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub issuer: String,

    pub audience: String,

    pub expiry_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - `DATABASE_URL` is missing while `STORAGE=postgres`
    /// - A numeric or boolean variable doesn't parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var_or("API_HOST", "0.0.0.0");
        let port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;
        let production = var_or("API_PRODUCTION", "false")
            .parse::<bool>()
            .context("API_PRODUCTION must be true or false")?;
        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:4200")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let storage = match var_or("STORAGE", "postgres").to_lowercase().as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => anyhow::bail!("STORAGE must be 'postgres' or 'memory', got '{}'", other),
        };

        let database_url = match (lookup("DATABASE_URL"), storage) {
            (Some(url), _) => url,
            (None, StorageBackend::Memory) => String::new(),
            (None, StorageBackend::Postgres) => {
                anyhow::bail!("DATABASE_URL environment variable is required")
            }
        };
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let expiry_minutes = var_or("JWT_EXPIRY_MINUTES", "60")
            .parse::<i64>()
            .context("JWT_EXPIRY_MINUTES must be an integer")?;
        if expiry_minutes <= 0 {
            anyhow::bail!("JWT_EXPIRY_MINUTES must be greater than zero");
        }
        if expiry_minutes > MAX_JWT_EXPIRY_MINUTES {
            anyhow::bail!(
                "JWT_EXPIRY_MINUTES must be at most {} (30 days)",
                MAX_JWT_EXPIRY_MINUTES
            );
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: var_or("JWT_ISSUER", DEFAULT_ISSUER),
                audience: var_or("JWT_AUDIENCE", DEFAULT_AUDIENCE),
                expiry_minutes,
            },
            storage,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Token settings for issuing and validating JWTs
    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings::new(self.jwt.secret.clone())
            .with_issuer_and_audience(self.jwt.issuer.clone(), self.jwt.audience.clone())
            .with_expiration(chrono::Duration::minutes(self.jwt.expiry_minutes))
    }
}
