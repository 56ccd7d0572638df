//! Contact form endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
};
use notify::ContactNotification;
use site_core::{parse_payload, ContactPayload, SubmissionKind};
use std::time::Instant;
use telemetry::metrics;
use tracing::warn;

use crate::extractors::ClientIp;
use crate::response::{ApiError, SubmitResponse};
use crate::routes::pipeline::{
    accepted, discard, enforce_rate_limit, read_body, rejected, require_json,
};
use crate::state::AppState;

const KIND: SubmissionKind = SubmissionKind::Contact;

/// POST /api/contact - Forward a contact message to the site owners.
pub async fn submit_contact(
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

    let contact = parse_payload::<ContactPayload>(KIND, &body)
        .and_then(ContactPayload::validate)
        .map_err(rejected(KIND))?;

    if contact.is_bot() {
        return Ok(discard(KIND, client_ip.as_deref()));
    }

    let contact = contact.sanitized().map_err(rejected(KIND))?;
    let notification = ContactNotification::new(contact, client_ip);
    if let Err(e) = state.notifier.send(&notification).await {
        warn!(kind = %KIND, "Failed to deliver contact message");
        return Err(e.into());
    }

    Ok(accepted(KIND, start))
}
