//! Test fixtures and payload generators.

use serde_json::{json, Value};
use uuid::Uuid;

/// Token of a signed-in administrator.
pub const ADMIN_TOKEN: &str = "admin-session-token";
pub const ADMIN_EMAIL: &str = "Owner@Example.com";

/// Token of a signed-in user who is not an administrator.
pub const READER_TOKEN: &str = "reader-session-token";
pub const READER_EMAIL: &str = "reader@example.com";

/// Token of a user account without an email.
pub const NO_EMAIL_TOKEN: &str = "phone-only-token";

/// Client address used for submissions.
pub const CLIENT_IP: &str = "203.0.113.10";

/// Slug of the post comments are attached to.
pub const POST_SLUG: &str = "pricing-strategy";

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Generate a valid comment payload for a post.
pub fn comment_payload(post_id: Uuid) -> Value {
    json!({
        "postId": post_id.to_string(),
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "content": "Great write-up on pricing, thanks for sharing."
    })
}

/// Generate a valid newsletter payload.
pub fn newsletter_payload(email: &str) -> Value {
    json!({
        "email": email,
        "name": "Grace"
    })
}

/// Generate a valid contact payload.
pub fn contact_payload() -> Value {
    json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "We would like to discuss a pricing engagement.",
        "verificationToken": "turnstile-token"
    })
}

/// Add a filled honeypot to any payload.
pub fn with_honeypot(mut payload: Value) -> Value {
    payload["honeypot"] = json!("http://spam.example");
    payload
}
