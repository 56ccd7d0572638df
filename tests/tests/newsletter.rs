//! End-to-end tests for newsletter signup.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

async fn subscribe(server: &TestServer, payload: &Value) -> axum_test::TestResponse {
    server
        .post("/api/newsletter")
        .add_header("X-Forwarded-For", fixtures::CLIENT_IP)
        .json(payload)
        .await
}

#[tokio::test]
async fn test_new_email_is_subscribed_lowercased() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = subscribe(&server, &fixtures::newsletter_payload("  New.Reader@Example.COM ")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true }));

    let subscriber = ctx
        .store
        .subscriber("new.reader@example.com")
        .expect("subscriber should be stored");
    assert!(subscriber.is_active);
    assert_eq!(subscriber.name.as_deref(), Some("Grace"));
}

#[tokio::test]
async fn test_active_subscriber_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let payload = fixtures::newsletter_payload("reader@example.com");

    subscribe(&server, &payload).await.assert_status_ok();
    let response = subscribe(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "This email is already subscribed");
    assert_eq!(ctx.store.subscribers().len(), 1);
}

#[tokio::test]
async fn test_inactive_subscriber_is_reactivated() {
    let ctx = TestContext::new();
    let id = ctx.store.seed_subscriber("lapsed@example.com", false);
    let server = ctx.server();

    let response = subscribe(&server, &fixtures::newsletter_payload("Lapsed@example.com")).await;

    response.assert_status_ok();
    let subscriber = ctx.store.subscriber("lapsed@example.com").unwrap();
    assert_eq!(subscriber.id, id);
    assert!(subscriber.is_active);
    assert_eq!(subscriber.name.as_deref(), Some("Grace"));
    assert_eq!(ctx.store.subscribers().len(), 1);
}

#[tokio::test]
async fn test_lost_insert_race_is_already_subscribed() {
    let ctx = TestContext::new();
    ctx.store.seed_subscriber("racer@example.com", true);
    ctx.store.set_lose_insert_race(true);
    let server = ctx.server();

    let response = subscribe(&server, &fixtures::newsletter_payload("racer@example.com")).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "This email is already subscribed");
}

#[tokio::test]
async fn test_name_is_optional() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = subscribe(&server, &json!({ "email": "quiet@example.com" })).await;

    response.assert_status_ok();
    assert_eq!(ctx.store.subscriber("quiet@example.com").unwrap().name, None);
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = subscribe(&server, &json!({ "email": "not-an-email" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid email address");
    assert!(ctx.store.subscribers().is_empty());
}

#[tokio::test]
async fn test_honeypot_returns_204() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let payload = fixtures::with_honeypot(fixtures::newsletter_payload("bot@example.com"));
    let response = subscribe(&server, &payload).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());
    assert!(ctx.store.subscribers().is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/newsletter")
        .text("email=reader@example.com")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_put_returns_405() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .put("/api/newsletter")
        .json(&fixtures::newsletter_payload("reader@example.com"))
        .await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_store_failure_returns_500() {
    let ctx = TestContext::new();
    ctx.store.set_should_fail(true);
    let server = ctx.server();

    let response = subscribe(&server, &fixtures::newsletter_payload("reader@example.com")).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Something went wrong. Please try again later.");
}
