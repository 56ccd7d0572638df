//! End-to-end tests for comment submission.

use api::middleware::rate_limit::RateLimitConfig;
use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};
use uuid::Uuid;

async fn submit(server: &TestServer, payload: &Value) -> axum_test::TestResponse {
    server
        .post("/api/comments")
        .add_header("X-Forwarded-For", fixtures::CLIENT_IP)
        .json(payload)
        .await
}

#[tokio::test]
async fn test_valid_comment_is_stored_unapproved() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = submit(&server, &fixtures::comment_payload(ctx.post_id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true }));

    let comments = ctx.store.comments();
    assert_eq!(comments.len(), 1);
    assert!(!comments[0].approved);
    assert_eq!(comments[0].comment.post_id, ctx.post_id);
    assert_eq!(comments[0].comment.author_name, "Ada Lovelace");
}

#[tokio::test]
async fn test_short_content_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let payload = json!({
        "postId": ctx.post_id.to_string(),
        "name": "Al",
        "email": "a@b.com",
        "content": "short"
    });
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Content must be at least 10 characters");
    assert!(ctx.store.comments().is_empty());
}

#[tokio::test]
async fn test_long_content_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["content"] = json!("x".repeat(2001));
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Content must be at most 2000 characters");
    assert!(ctx.store.comments().is_empty());
}

#[tokio::test]
async fn test_invalid_post_id_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["postId"] = json!("not-a-uuid");
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid post ID");
}

#[tokio::test]
async fn test_honeypot_returns_204_and_stores_nothing() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let payload = fixtures::with_honeypot(fixtures::comment_payload(ctx.post_id));
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());
    assert!(ctx.store.comments().is_empty());
}

#[tokio::test]
async fn test_invalid_payload_with_honeypot_is_still_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::with_honeypot(fixtures::comment_payload(ctx.post_id));
    payload["email"] = json!("not-an-email");
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn test_markup_is_sanitized_before_storage() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["name"] = json!("<b>Ada</b>");
    payload["content"] =
        json!("<script>alert('x')</script><img src=x onerror=alert(1)>Solid pricing advice");
    let response = submit(&server, &payload).await;

    response.assert_status_ok();
    let stored = &ctx.store.comments()[0].comment;
    assert_eq!(stored.author_name, "Ada");
    assert_eq!(stored.content, "Solid pricing advice");
}

#[tokio::test]
async fn test_markup_only_comment_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["name"] = json!("<i></i>");
    payload["content"] = json!("<script>xxxxxxxxxxxx</script>");
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Name must be at least 2 characters");
    assert!(ctx.store.comments().is_empty());
}

#[tokio::test]
async fn test_ampersands_are_stored_verbatim() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["name"] = json!("Tom & Jerry");
    payload["content"] = json!("Loved the Q&A section, thanks!");
    submit(&server, &payload).await.assert_status_ok();

    let stored = &ctx.store.comments()[0].comment;
    assert_eq!(stored.author_name, "Tom & Jerry");
    assert_eq!(stored.content, "Loved the Q&A section, thanks!");
}

#[tokio::test]
async fn test_oversized_body_gets_json_envelope() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut payload = fixtures::comment_payload(ctx.post_id);
    payload["content"] = json!("x".repeat(3 * 1024 * 1024));
    let response = submit(&server, &payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": false, "error": "Request body too large" }));
    assert!(ctx.store.comments().is_empty());
}

#[tokio::test]
async fn test_non_json_content_type_returns_415() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/comments")
        .add_header("X-Forwarded-For", fixtures::CLIENT_IP)
        .text("postId=1&name=Ada")
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    assert_eq!(body["error"], "Content-Type must be application/json");
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/comments")
        .content_type("application/json")
        .bytes("{\"postId\":".to_string().into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_get_returns_405() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/comments").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": false, "error": "Method not allowed" }));
}

#[tokio::test]
async fn test_rate_limit_after_max_submissions() {
    let ctx = TestContext::with_rate_limit(RateLimitConfig {
        max_submissions: 2,
        window_ms: 600_000,
    });
    let server = ctx.server();
    let payload = fixtures::comment_payload(ctx.post_id);

    submit(&server, &payload).await.assert_status_ok();
    submit(&server, &payload).await.assert_status_ok();

    let response = submit(&server, &payload).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .header("retry-after")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 600);
    let body: Value = response.json();
    assert_eq!(body["error"], "Too many attempts. Please try again later.");
    assert_eq!(ctx.store.comments().len(), 2);

    // Another client is unaffected
    server
        .post("/api/comments")
        .add_header("X-Forwarded-For", "198.51.100.77")
        .json(&payload)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_rate_limit_is_checked_before_validation() {
    let ctx = TestContext::with_rate_limit(RateLimitConfig {
        max_submissions: 1,
        window_ms: 600_000,
    });
    let server = ctx.server();
    let invalid = json!({ "postId": Uuid::new_v4().to_string() });

    submit(&server, &invalid)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    submit(&server, &invalid)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_store_failure_returns_generic_500() {
    let ctx = TestContext::new();
    ctx.store.set_should_fail(true);
    let server = ctx.server();

    let response = submit(&server, &fixtures::comment_payload(ctx.post_id)).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "success": false, "error": "Something went wrong. Please try again later." })
    );
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = submit(&server, &fixtures::comment_payload(ctx.post_id)).await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(
        response.header("referrer-policy"),
        "strict-origin-when-cross-origin"
    );
    assert_eq!(
        response.header("permissions-policy"),
        "camera=(), microphone=(), geolocation=()"
    );
    assert_eq!(response.header("cache-control"), "no-store");
}
