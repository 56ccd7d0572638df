//! Comment submission endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
};
use site_core::{parse_payload, CommentPayload, SubmissionKind};
use std::time::Instant;
use store_client::NewComment;
use telemetry::metrics;
use tracing::debug;

use crate::extractors::ClientIp;
use crate::response::{ApiError, SubmitResponse};
use crate::routes::pipeline::{
    accepted, discard, enforce_rate_limit, read_body, rejected, require_json, store_failed,
};
use crate::state::AppState;

const KIND: SubmissionKind = SubmissionKind::Comment;

/// POST /api/comments - Submit a comment for moderation.
///
/// Comments are stored unapproved and only appear once an administrator
/// approves them.
pub async fn submit_comment(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<SubmitResponse, ApiError> {
    let start = Instant::now();
    metrics().submissions_received.inc();

    enforce_rate_limit(&state.rate_limiters, client_ip.as_deref(), KIND)?;
    require_json(&headers)?;
    let body = read_body(KIND, body)?;

    let comment = parse_payload::<CommentPayload>(KIND, &body)
        .and_then(CommentPayload::validate)
        .map_err(rejected(KIND))?;

    if comment.is_bot() {
        return Ok(discard(KIND, client_ip.as_deref()));
    }

    let comment = NewComment::from(comment.sanitized().map_err(rejected(KIND))?);
    let post_id = comment.post_id;

    state
        .store
        .insert_comment(comment)
        .await
        .map_err(store_failed(KIND))?;

    debug!(post_id = %post_id, "Comment stored for moderation");
    Ok(accepted(KIND, start))
}
