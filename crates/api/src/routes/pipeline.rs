//! Steps shared by the public submission handlers.

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{header, HeaderMap, StatusCode},
};
use site_core::{limits::MAX_BODY_SIZE_BYTES, Error, ErrorKind, SubmissionKind};
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::middleware::rate_limit::RateLimitResult;
use crate::response::{ApiError, SubmitResponse};
use crate::state::RateLimiters;

/// Count the submission against the client's window for this form.
pub(crate) fn enforce_rate_limit(
    limiters: &RateLimiters,
    client_ip: Option<&str>,
    kind: SubmissionKind,
) -> Result<(), ApiError> {
    match limiters.for_kind(kind).check(client_ip) {
        RateLimitResult::Allowed { remaining } => {
            debug!(kind = %kind, remaining, "Rate limit check passed");
            Ok(())
        }
        limited @ RateLimitResult::Limited { .. } => {
            metrics().rate_limited_requests.inc();
            let retry_after_secs = limited.retry_after_secs();
            warn!(
                kind = %kind,
                client_ip = client_ip.unwrap_or("unknown"),
                retry_after_secs,
                "Submission rate limited"
            );
            Err(Error::rate_limited(retry_after_secs).into())
        }
    }
}

/// Reject bodies that are not declared as JSON.
pub(crate) fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));

    if is_json {
        Ok(())
    } else {
        Err(Error::UnsupportedMediaType.into())
    }
}

/// Take the buffered body. Bodies over the limit were cut off by
/// `DefaultBodyLimit` and are reported like any other oversized body.
pub(crate) fn read_body(
    kind: SubmissionKind,
    body: Result<Bytes, BytesRejection>,
) -> Result<Bytes, ApiError> {
    let body = body.map_err(|rejection| {
        metrics().validation_failures.inc();
        let message = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            "Request body too large"
        } else {
            "Invalid request body"
        };
        ApiError::from(Error::validation(kind, message))
    })?;
    check_body_size(kind, &body)?;
    Ok(body)
}

fn check_body_size(kind: SubmissionKind, body: &[u8]) -> Result<(), ApiError> {
    if body.len() > MAX_BODY_SIZE_BYTES {
        metrics().validation_failures.inc();
        return Err(Error::validation(kind, "Request body too large").into());
    }
    Ok(())
}

/// Map a parse or validation failure to a 400.
pub(crate) fn rejected(kind: SubmissionKind) -> impl Fn(Error) -> ApiError {
    move |err| {
        if err.kind() == ErrorKind::Validation {
            metrics().validation_failures.inc();
            debug!(kind = %kind, reason = %err.public_message(), "Submission rejected");
        }
        err.into()
    }
}

/// Map a store failure, counting unexpected ones.
pub(crate) fn store_failed(kind: SubmissionKind) -> impl Fn(Error) -> ApiError {
    move |err| {
        if err.kind() == ErrorKind::Unexpected {
            metrics().store_errors.inc();
            warn!(kind = %kind, "Failed to persist submission");
        }
        err.into()
    }
}

/// Honeypot path: pretend success, keep nothing.
pub(crate) fn discard(kind: SubmissionKind, client_ip: Option<&str>) -> SubmitResponse {
    metrics().bot_submissions.inc();
    debug!(
        kind = %kind,
        client_ip = client_ip.unwrap_or("unknown"),
        "Honeypot filled, discarding submission"
    );
    SubmitResponse::Discarded
}

pub(crate) fn accepted(kind: SubmissionKind, start: Instant) -> SubmitResponse {
    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().submissions_accepted.inc();
    metrics().submit_latency_ms.observe(latency_ms);

    info!(kind = %kind, latency_ms, "Submission accepted");
    SubmitResponse::Accepted
}
