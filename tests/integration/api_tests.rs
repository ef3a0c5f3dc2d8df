//! API integration tests
//!
//! Require a running server with a seeded administrator:
//! `TOOLKIT_SEED__ADMIN_PASSWORD=admin-password cargo run`, then
//! `cargo test --test api_tests -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("TOOLKIT_TEST_URL").unwrap_or_else(|_| "http://localhost:8080/api/v1".to_string())
}

fn admin_password() -> String {
    std::env::var("TOOLKIT_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-password".to_string())
}

/// Suffix that keeps names and SKUs unique across runs
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": "admin",
            "password": admin_password()
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["data"]["token"].as_str().expect("No token in response").to_string()
}

async fn create_category(client: &Client, token: &str) -> i64 {
    let body: Value = client
        .post(format!("{}/categories", base_url()))
        .bearer_auth(token)
        .json(&json!({ "name": unique("Hand tools"), "color": "#1F2937" }))
        .send()
        .await
        .expect("Failed to create category")
        .json()
        .await
        .expect("Failed to parse category");
    body["data"]["id"].as_i64().expect("No category id")
}

async fn create_toolkit(client: &Client, token: &str, quantity: i64) -> i64 {
    let category_id = create_category(client, token).await;
    let response = client
        .post(format!("{}/toolkits", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "name": unique("Socket set"),
            "sku": unique("SKT"),
            "category_id": category_id,
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create toolkit");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse toolkit");
    assert_eq!(body["data"]["available"], quantity);
    assert_eq!(body["data"]["status"], "available");
    body["data"]["id"].as_i64().expect("No toolkit id")
}

async fn get_toolkit(client: &Client, token: &str, id: i64) -> Value {
    let body: Value = client
        .get(format!("{}/toolkits/{}", base_url(), id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get toolkit")
        .json()
        .await
        .expect("Failed to parse toolkit");
    body["data"].clone()
}

async fn current_user_id(client: &Client, token: &str) -> i64 {
    let body: Value = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get current user")
        .json()
        .await
        .expect("Failed to parse user");
    body["data"]["id"].as_i64().expect("No user id")
}

async fn borrow(client: &Client, token: &str, toolkit_id: i64, quantity: i64) -> reqwest::Response {
    let user_id = current_user_id(client, token).await;
    client
        .post(format!("{}/loans", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "user_id": user_id,
            "toolkit_id": toolkit_id,
            "quantity": quantity,
            "purpose": "Integration test",
            "due_date": (Utc::now() + Duration::days(7)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to create loan")
}

async fn update_loan(client: &Client, token: &str, loan_id: i64, patch: Value) -> reqwest::Response {
    client
        .put(format!("{}/loans/{}", base_url(), loan_id))
        .bearer_auth(token)
        .json(&patch)
        .send()
        .await
        .expect("Failed to update loan")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": "admin",
            "password": admin_password()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert!(body["data"]["user"].get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_restores_stock() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let toolkit_id = create_toolkit(&client, &token, 10).await;

    let response = borrow(&client, &token, toolkit_id, 3).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(loan["data"]["status"], "borrowed");
    let loan_id = loan["data"]["id"].as_i64().expect("No loan id");

    let toolkit = get_toolkit(&client, &token, toolkit_id).await;
    assert_eq!(toolkit["quantity"], 10);
    assert_eq!(toolkit["available"], 7);
    assert_eq!(toolkit["status"], "available");

    let response = update_loan(&client, &token, loan_id, json!({ "status": "returned" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    assert!(loan["data"]["return_date"].is_string());

    let toolkit = get_toolkit(&client, &token, toolkit_id).await;
    assert_eq!(toolkit["available"], 10);
    assert_eq!(toolkit["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_over_borrowing_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let toolkit_id = create_toolkit(&client, &token, 2).await;

    let response = borrow(&client, &token, toolkit_id, 3).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["code"], "insufficient_stock");

    let toolkit = get_toolkit(&client, &token, toolkit_id).await;
    assert_eq!(toolkit["available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_last_units_mark_toolkit_borrowed() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let toolkit_id = create_toolkit(&client, &token, 2).await;

    assert_eq!(borrow(&client, &token, toolkit_id, 2).await.status(), StatusCode::CREATED);

    let toolkit = get_toolkit(&client, &token, toolkit_id).await;
    assert_eq!(toolkit["available"], 0);
    assert_eq!(toolkit["status"], "borrowed");
}

#[tokio::test]
#[ignore]
async fn test_reborrow_without_stock_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let toolkit_id = create_toolkit(&client, &token, 3).await;

    let first: Value = borrow(&client, &token, toolkit_id, 2)
        .await
        .json()
        .await
        .expect("Failed to parse loan");
    let first_id = first["data"]["id"].as_i64().expect("No loan id");
    update_loan(&client, &token, first_id, json!({ "status": "returned" })).await;

    assert_eq!(borrow(&client, &token, toolkit_id, 2).await.status(), StatusCode::CREATED);

    let response = update_loan(&client, &token, first_id, json!({ "status": "borrowed" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let toolkit = get_toolkit(&client, &token, toolkit_id).await;
    assert_eq!(toolkit["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_stock_adjustment_clamps_at_zero() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let toolkit_id = create_toolkit(&client, &token, 4).await;

    let response = client
        .patch(format!("{}/toolkits/{}/stock", base_url(), toolkit_id))
        .bearer_auth(&token)
        .json(&json!({ "quantity_change": -10, "reason": "Flood damage" }))
        .send()
        .await
        .expect("Failed to adjust stock");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse toolkit");
    assert_eq!(body["data"]["quantity"], 0);
    assert_eq!(body["data"]["available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_toolkit_list_is_paginated() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/toolkits?page=0&page_size=-1", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list toolkits");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse list");
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["page_size"], 10);
    assert!(body["pagination"]["total_pages"].as_i64().unwrap_or(0) >= 1);
}

#[tokio::test]
#[ignore]
async fn test_overdue_filter_returns_only_late_loans() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body: Value = client
        .get(format!("{}/loans?overdue=true", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list loans")
        .json()
        .await
        .expect("Failed to parse list");

    assert!(body["count"].is_number());
    for loan in body["data"].as_array().expect("data array") {
        assert_eq!(loan["is_overdue"], true);
    }
}
