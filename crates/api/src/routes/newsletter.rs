//! Newsletter signup endpoint.
//!
//! Subscribers are keyed by lower-cased email:
//! - unknown email: inserted as active
//! - inactive subscriber: reactivated, name refreshed
//! - active subscriber: rejected as already subscribed
//!
//! Two concurrent signups for a new email can both miss the lookup; the
//! loser hits the unique key and gets the same "already subscribed" answer.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
};
use site_core::{parse_payload, Error, NewsletterPayload, Result, SubmissionKind, ValidatedSubscription};
use std::time::Instant;
use store_client::{ContentStore, NewSubscriber};
use telemetry::metrics;
use tracing::debug;

use crate::extractors::ClientIp;
use crate::response::{ApiError, SubmitResponse};
use crate::routes::pipeline::{
    accepted, discard, enforce_rate_limit, read_body, rejected, store_failed,
};
use crate::state::AppState;

const KIND: SubmissionKind = SubmissionKind::Newsletter;

/// How a signup was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    Reactivated,
}

/// Apply a validated signup to the subscriber list.
pub async fn subscribe(
    store: &dyn ContentStore,
    subscription: ValidatedSubscription,
) -> Result<SubscribeOutcome> {
    match store.find_subscriber(&subscription.email).await? {
        Some(existing) if existing.is_active => Err(Error::AlreadySubscribed),
        Some(existing) => {
            store
                .reactivate_subscriber(existing.id, subscription.name)
                .await?;
            Ok(SubscribeOutcome::Reactivated)
        }
        None => match store.insert_subscriber(NewSubscriber::from(subscription)).await {
            Ok(()) => Ok(SubscribeOutcome::Subscribed),
            Err(Error::DuplicateKey(_)) => Err(Error::AlreadySubscribed),
            Err(e) => Err(e),
        },
    }
}

/// POST /api/newsletter - Subscribe to the newsletter.
pub async fn submit_newsletter(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<SubmitResponse, ApiError> {
    let start = Instant::now();
    metrics().submissions_received.inc();

    enforce_rate_limit(&state.rate_limiters, client_ip.as_deref(), KIND)?;
    let body = read_body(KIND, body)?;

    let subscription = parse_payload::<NewsletterPayload>(KIND, &body)
        .and_then(NewsletterPayload::validate)
        .map_err(rejected(KIND))?;

    if subscription.is_bot() {
        return Ok(discard(KIND, client_ip.as_deref()));
    }

    let subscription = subscription.sanitized().map_err(rejected(KIND))?;
    let outcome = subscribe(state.store.as_ref(), subscription)
        .await
        .map_err(store_failed(KIND))?;

    debug!(outcome = ?outcome, "Newsletter signup applied");
    Ok(accepted(KIND, start))
}
