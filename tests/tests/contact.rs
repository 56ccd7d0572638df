//! End-to-end tests for the contact form.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

async fn send(server: &TestServer, payload: &Value) -> axum_test::TestResponse {
    server
        .post("/api/contact")
        .add_header("X-Forwarded-For", fixtures::CLIENT_IP)
        .json(payload)
        .await
}

#[tokio::test]
async fn test_valid_message_is_forwarded() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = send(&server, &fixtures::contact_payload()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true }));

    let sent = ctx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, "Grace Hopper");
    assert_eq!(sent[0].email, "grace@example.com");
    assert_eq!(sent[0].client_ip.as_deref(), Some(fixtures::CLIENT_IP));
    assert_eq!(sent[0].verification_token.as_deref(), Some("turnstile-token"));
}

#[tokio::test]
async fn test_message_markup_is_escaped() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["message"] = json!("<script>steal()</script>Budget is 5k < 10k & flexible");
    send(&server, &payload).await.assert_status_ok();

    let sent = ctx.notifier.sent();
    assert_eq!(sent[0].message, "Budget is 5k &lt; 10k & flexible");
}

#[tokio::test]
async fn test_message_of_only_markup_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["message"] = json!("<style>body { display: none }</style>");
    let response = send(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Message must be at least 10 characters");
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_short_message_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::contact_payload();
    payload["message"] = json!("Hi");
    let response = send(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Message must be at least 10 characters");
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_missing_name_is_rejected_first() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = send(&server, &json!({ "email": "bad", "message": "x" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Name must be at least 2 characters");
}

#[tokio::test]
async fn test_honeypot_returns_204_and_sends_nothing() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = send(&server, &fixtures::with_honeypot(fixtures::contact_payload())).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_non_json_content_type_returns_415() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/contact")
        .content_type("application/x-www-form-urlencoded")
        .bytes("name=Grace".to_string().into())
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_notifier_failure_returns_500() {
    let ctx = TestContext::new();
    ctx.notifier.set_should_fail(true);
    let server = ctx.server();

    let response = send(&server, &fixtures::contact_payload()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Something went wrong. Please try again later.");
}

#[tokio::test]
async fn test_contact_limit_is_separate_from_comments() {
    let ctx = TestContext::with_rate_limit(api::middleware::rate_limit::RateLimitConfig {
        max_submissions: 1,
        window_ms: 600_000,
    });
    let server = ctx.server();

    send(&server, &fixtures::contact_payload()).await.assert_status_ok();
    send(&server, &fixtures::contact_payload())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    server
        .post("/api/comments")
        .add_header("X-Forwarded-For", fixtures::CLIENT_IP)
        .json(&fixtures::comment_payload(ctx.post_id))
        .await
        .assert_status_ok();
}
