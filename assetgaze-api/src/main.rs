//! # Assetgaze API Server
//!
//! Serves the authentication, transaction, account and broker endpoints.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/assetgaze JWT_SECRET=... cargo run -p assetgaze-api
//! STORAGE=memory JWT_SECRET=... cargo run -p assetgaze-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON log lines.

use anyhow::Context;
use assetgaze_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use assetgaze_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Assetgaze API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address();

    let state = match config.storage {
        StorageBackend::Postgres => {
            ensure_database_exists(&config.database.url)
                .await
                .context("Failed to ensure database exists")?;

            let pool = create_pool(
                DatabaseConfig::new(config.database.url.clone())
                    .with_max_connections(config.database.max_connections),
            )
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            AppState::new(pool, config)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will be lost on shutdown");
            AppState::in_memory(config)
        }
    };

    let db = state.db.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(pool) = db {
        close_pool(pool).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "assetgaze_api=debug,assetgaze_shared=debug,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
