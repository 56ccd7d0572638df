//! Newsletter subscriber lookups and writes.

use crate::client::{decode_error, StoreClient};
use crate::models::{NewSubscriber, Reactivation, Subscriber};
use reqwest::Method;
use site_core::Result;
use tracing::debug;
use uuid::Uuid;

pub const SUBSCRIBERS_TABLE: &str = "newsletter_subscribers";

/// Find a subscriber by (already normalized) email.
pub async fn find_subscriber(client: &StoreClient, email: &str) -> Result<Option<Subscriber>> {
    let request = client
        .rest(Method::GET, SUBSCRIBERS_TABLE)?
        .query(&[
            ("email", format!("eq.{}", email)),
            ("select", "id,email,is_active".to_string()),
            ("limit", "1".to_string()),
        ]);

    let rows: Vec<Subscriber> = client
        .send(request)
        .await?
        .json()
        .await
        .map_err(decode_error)?;

    Ok(rows.into_iter().next())
}

/// Insert a new active subscriber.
///
/// A concurrent signup for the same email surfaces as `Error::DuplicateKey`.
pub async fn insert_subscriber(client: &StoreClient, subscriber: &NewSubscriber) -> Result<()> {
    let request = client
        .rest(Method::POST, SUBSCRIBERS_TABLE)?
        .header("Prefer", "return=minimal")
        .json(subscriber);

    client.send(request).await?;

    debug!("Inserted newsletter subscriber");
    Ok(())
}

/// Flip an inactive subscriber back to active.
pub async fn reactivate_subscriber(
    client: &StoreClient,
    id: Uuid,
    name: Option<String>,
) -> Result<()> {
    let request = client
        .rest(Method::PATCH, SUBSCRIBERS_TABLE)?
        .query(&[("id", format!("eq.{}", id))])
        .header("Prefer", "return=minimal")
        .json(&Reactivation::now(name));

    client.send(request).await?;

    debug!(subscriber_id = %id, "Reactivated newsletter subscriber");
    Ok(())
}
