/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use assetgaze_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use assetgaze_shared::{
    auth::{jwt::TokenSettings, middleware::authenticate},
    repository::Repositories,
    services::{AccountService, AuthService, BrokerService, TransactionService},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside is
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Database pool (None when running on the in-memory store)
    pub db: Option<PgPool>,

    /// Storage used by the services
    pub repos: Repositories,

    /// Application configuration
    pub config: Arc<Config>,

    /// JWT signing and validation settings
    pub tokens: Arc<TokenSettings>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn new(db: PgPool, config: Config) -> Self {
        let repos = Repositories::postgres(db.clone());
        Self::with_repositories(Some(db), repos, config)
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: Config) -> Self {
        Self::with_repositories(None, Repositories::in_memory(), config)
    }

    pub fn with_repositories(db: Option<PgPool>, repos: Repositories, config: Config) -> Self {
        let tokens = Arc::new(config.token_settings());
        Self {
            db,
            repos,
            config: Arc::new(config),
            tokens,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(&self.repos, self.tokens.clone())
    }

    pub fn transaction_service(&self) -> TransactionService {
        TransactionService::new(&self.repos)
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(&self.repos)
    }

    pub fn broker_service(&self) -> BrokerService {
        BrokerService::new(&self.repos)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                        (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register             (public)
///     │   ├── POST /login                (public)
///     │   ├── GET  /status
///     │   └── POST /logout
///     ├── /transactions/
///     │   ├── POST   /
///     │   ├── GET    /user
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   └── DELETE /:id
///     ├── /accounts/   POST, GET
///     └── /brokers/    POST, GET, GET /:id
/// ```
///
/// Everything outside `/health`, `/register` and `/login` requires a bearer
/// token.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_layer = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_auth_routes = Router::new()
        .route("/status", get(routes::auth::status))
        .route("/logout", post(routes::auth::logout))
        .route_layer(auth_layer.clone());

    let transaction_routes = Router::new()
        .route("/", post(routes::transactions::create_transaction))
        .route("/user", get(routes::transactions::list_user_transactions))
        .route(
            "/:id",
            get(routes::transactions::get_transaction)
                .put(routes::transactions::update_transaction)
                .delete(routes::transactions::delete_transaction),
        )
        .route_layer(auth_layer.clone());

    let account_routes = Router::new()
        .route(
            "/",
            post(routes::accounts::create_account).get(routes::accounts::list_accounts),
        )
        .route_layer(auth_layer.clone());

    let broker_routes = Router::new()
        .route(
            "/",
            post(routes::brokers::create_broker).get(routes::brokers::list_brokers),
        )
        .route("/:id", get(routes::brokers::get_broker))
        .route_layer(auth_layer);

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/transactions", transaction_routes)
        .nest("/accounts", account_routes)
        .nest("/brokers", broker_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([header::LOCATION])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects `AuthContext` into request
/// extensions. Any failure is a 401.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), &state.tokens).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
