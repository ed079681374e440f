/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 1, "total_connections": 2 },
///   "migrations": { "applied_migrations": 2, "latest_version": 20250601000002, "is_up_to_date": true }
/// }
/// ```

use crate::{app::AppState, config::StorageBackend, error::ApiResult};
use assetgaze_shared::db::{
    migrations::{get_migration_status, MigrationStatus},
    pool::{get_pool_stats, health_check as db_health_check, PoolStats},
};
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: &'static str,

    pub version: &'static str,

    pub storage: StorageBackend,

    /// `connected`, `disconnected` or `not_configured`
    pub database: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

/// Reports liveness and database connectivity
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let (database, pool, migrations) = match &state.db {
        Some(db) => match db_health_check(db).await {
            Ok(()) => (
                "connected",
                Some(get_pool_stats(db)),
                get_migration_status(db).await.ok(),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                ("disconnected", Some(get_pool_stats(db)), None)
            }
        },
        None => ("not_configured", None, None),
    };

    let healthy = match state.config.storage {
        StorageBackend::Memory => true,
        StorageBackend::Postgres => database == "connected",
    };

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: state.config.storage,
        database,
        pool,
        migrations,
    }))
}
