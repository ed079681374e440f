/// Integration tests for the transaction, account and broker endpoints
mod common;

use assetgaze_shared::repository::PermissionRepository;
use axum::http::{header, Method, StatusCode};
use common::{transaction_body, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_protected_routes_reject_missing_token() {
    let ctx = TestContext::new();
    let id = Uuid::new_v4();

    let routes = [
        (Method::POST, "/api/transactions".to_string()),
        (Method::GET, "/api/transactions/user".to_string()),
        (Method::GET, format!("/api/transactions/{}", id)),
        (Method::PUT, format!("/api/transactions/{}", id)),
        (Method::DELETE, format!("/api/transactions/{}", id)),
        (Method::GET, "/api/accounts".to_string()),
        (Method::GET, "/api/brokers".to_string()),
    ];

    for (method, uri) in routes {
        let response = ctx.send(method.clone(), &uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;
    let account_id = ctx.create_account(&token, "Stocks ISA").await;
    let broker_id = ctx.create_broker(&token, "AJ Bell").await;

    // Create
    let response = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(transaction_body(account_id, broker_id)),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();
    assert_eq!(
        response.headers.get(header::LOCATION).unwrap(),
        &format!("/api/transactions/{}", id)
    );
    assert_eq!(response.body["transactionType"], "Buy");
    assert_eq!(response.body["taxWrapper"], "ISA");
    assert_eq!(response.body["accountId"], account_id.to_string());

    // Read
    let response = ctx
        .send(Method::GET, &format!("/api/transactions/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isin"], "GB00B4L5Y983");

    // Update
    let mut update = transaction_body(account_id, broker_id);
    update["transactionType"] = "Sell".into();
    update["brokerDealReference"] = serde_json::Value::Null;
    let response = ctx
        .send(Method::PUT, &format!("/api/transactions/{}", id), Some(&token), Some(update))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["transactionType"], "Sell");
    assert!(response.body["brokerDealReference"].is_null());

    // List
    let response = ctx.send(Method::GET, "/api/transactions/user", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    // Delete
    let response = ctx
        .send(Method::DELETE, &format!("/api/transactions/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx
        .send(Method::GET, &format!("/api/transactions/{}", id), Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(ctx.store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_create_in_foreign_account_is_forbidden() {
    let ctx = TestContext::new();
    let owner = ctx.user_token().await;
    let intruder = ctx.user_token().await;
    let account_id = ctx.create_account(&owner, "Owner ISA").await;
    let broker_id = ctx.create_broker(&owner, "AJ Bell").await;

    let response = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&intruder),
            Some(transaction_body(account_id, broker_id)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "forbidden");
    assert_eq!(ctx.store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_foreign_transaction_hidden_on_read_forbidden_on_write() {
    let ctx = TestContext::new();
    let owner = ctx.user_token().await;
    let intruder = ctx.user_token().await;
    let account_id = ctx.create_account(&owner, "Owner ISA").await;
    let broker_id = ctx.create_broker(&owner, "AJ Bell").await;

    let created = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&owner),
            Some(transaction_body(account_id, broker_id)),
        )
        .await;
    let uri = format!("/api/transactions/{}", created.body["id"].as_str().unwrap());

    let read = ctx.send(Method::GET, &uri, Some(&intruder), None).await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);

    let update = ctx
        .send(Method::PUT, &uri, Some(&intruder), Some(transaction_body(account_id, broker_id)))
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);

    let delete = ctx.send(Method::DELETE, &uri, Some(&intruder), None).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let listed = ctx.send(Method::GET, "/api/transactions/user", Some(&intruder), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert!(listed.body.as_array().unwrap().is_empty());

    assert_eq!(ctx.store.transaction_count().await, 1);
}

#[tokio::test]
async fn test_missing_transaction_is_not_found() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;
    let account_id = ctx.create_account(&token, "ISA").await;
    let uri = format!("/api/transactions/{}", Uuid::new_v4());

    let update = ctx
        .send(Method::PUT, &uri, Some(&token), Some(transaction_body(account_id, Uuid::new_v4())))
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_transaction_is_unprocessable() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;
    let account_id = ctx.create_account(&token, "ISA").await;

    let mut body = transaction_body(account_id, Uuid::new_v4());
    body["isin"] = "GB00".into();
    body["quantity"] = "0".into();

    let response = ctx.send(Method::POST, "/api/transactions", Some(&token), Some(body)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = response.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["isin", "quantity"]);
}

#[tokio::test]
async fn test_unknown_broker_is_unprocessable() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;
    let account_id = ctx.create_account(&token, "ISA").await;
    let broker_id = ctx.create_broker(&token, "AJ Bell").await;

    let response = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(transaction_body(account_id, Uuid::new_v4())),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["details"][0]["field"], "brokerId");
    assert_eq!(ctx.store.transaction_count().await, 0);

    let created = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(transaction_body(account_id, broker_id)),
        )
        .await;
    let uri = format!("/api/transactions/{}", created.body["id"].as_str().unwrap());

    let response = ctx
        .send(Method::PUT, &uri, Some(&token), Some(transaction_body(account_id, Uuid::new_v4())))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["details"][0]["field"], "brokerId");
}

#[tokio::test]
async fn test_malformed_bodies_use_json_errors() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;

    let response = ctx
        .send(Method::POST, "/api/transactions", Some(&token), Some(json!({ "isin": "GB00B4L5Y983" })))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "validation_error");
    assert_eq!(response.body["details"][0]["field"], "body");

    let response = ctx
        .send_raw(Method::POST, "/api/accounts", Some(&token), Some("{".to_string()))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");

    let response = ctx
        .send_raw(Method::POST, "/api/brokers", Some(&token), Some("[]".to_string()))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_revoked_grant_takes_effect_without_new_token() {
    let ctx = TestContext::new();
    let token = ctx.user_token().await;
    let account_id = ctx.create_account(&token, "ISA").await;
    let broker_id = ctx.create_broker(&token, "AJ Bell").await;

    let user_id: Uuid = ctx
        .send(Method::GET, "/api/auth/status", Some(&token), None)
        .await
        .body["userId"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    ctx.store.revoke(user_id, account_id).await.unwrap();

    let response = ctx
        .send(
            Method::POST,
            "/api/transactions",
            Some(&token),
            Some(transaction_body(account_id, broker_id)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_accounts_scoped_to_creator() {
    let ctx = TestContext::new();
    let alice = ctx.user_token().await;
    let bob = ctx.user_token().await;

    ctx.create_account(&alice, "Alice GIA").await;
    ctx.create_account(&bob, "Bob ISA").await;

    let response = ctx.send(Method::GET, "/api/accounts", Some(&alice), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let accounts = response.body.as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["name"], "Alice GIA");
}

#[tokio::test]
async fn test_brokers_shared_between_users() {
    let ctx = TestContext::new();
    let alice = ctx.user_token().await;
    let bob = ctx.user_token().await;

    let broker_id = ctx.create_broker(&alice, "Interactive Investor").await;

    let response = ctx
        .send(Method::GET, &format!("/api/brokers/{}", broker_id), Some(&bob), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Interactive Investor");

    let response = ctx.send(Method::GET, "/api/brokers", Some(&bob), None).await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = ctx
        .send(Method::GET, &format!("/api/brokers/{}", Uuid::new_v4()), Some(&bob), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
