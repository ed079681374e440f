#![allow(dead_code)]
//! Common test utilities for integration tests
//!
//! Builds the real router on top of the in-memory store, so the HTTP tests
//! need no database. Requests are driven through `tower::Service::call`.

use assetgaze_api::app::{build_router, AppState};
use assetgaze_api::config::Config;
use assetgaze_shared::repository::{MemoryRepository, Repositories};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "CorrectHorse1!";

/// Test context containing the router and the store behind it
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryRepository>,
    pub config: Config,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORAGE" => Some("memory".to_string()),
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config should load");

        let store = Arc::new(MemoryRepository::new());
        let state = AppState::with_repositories(
            None,
            Repositories::from_memory(store.clone()),
            config.clone(),
        );

        Self {
            app: build_router(state),
            store,
            config,
        }
    }

    /// Sends a request, optionally with a bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.send_raw(method, uri, token, body.map(|json| json.to_string())).await
    }

    /// Sends a request with a body that need not be valid JSON
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(text) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(text))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, headers, body }
    }

    pub async fn register(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers a fresh user and returns a bearer token for it
    pub async fn user_token(&self) -> String {
        let email = format!("user-{}@example.com", Uuid::new_v4());
        assert_eq!(self.register(&email, PASSWORD).await.status, StatusCode::OK);

        let response = self.login(&email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_account(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .send(Method::POST, "/api/accounts", Some(token), Some(json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn create_broker(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .send(Method::POST, "/api/brokers", Some(token), Some(json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_str().unwrap().parse().unwrap()
    }
}

/// A valid transaction request body
pub fn transaction_body(account_id: Uuid, broker_id: Uuid) -> Value {
    json!({
        "transactionType": "Buy",
        "brokerId": broker_id,
        "accountId": account_id,
        "taxWrapper": "ISA",
        "isin": "GB00B4L5Y983",
        "transactionDate": "2024-03-01T12:00:00Z",
        "quantity": "10",
        "nativePrice": "20.00",
        "localPrice": "20.00",
        "consideration": "200.00",
        "brokerCharge": "9.95",
        "brokerDealReference": "REF-001"
    })
}
