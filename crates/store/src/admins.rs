//! Administrator list lookups.

use crate::client::{decode_error, StoreClient};
use reqwest::Method;
use site_core::{normalize_email, Result};

pub const ADMINS_TABLE: &str = "admin_users";

/// Check whether an email belongs to the administrator list.
///
/// Emails are stored lower-cased; the comparison is case-insensitive.
pub async fn is_admin(client: &StoreClient, email: &str) -> Result<bool> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Ok(false);
    }

    let request = client
        .rest(Method::GET, ADMINS_TABLE)?
        .query(&[
            ("email", format!("eq.{}", email)),
            ("select", "email".to_string()),
            ("limit", "1".to_string()),
        ]);

    let rows: Vec<serde_json::Value> = client
        .send(request)
        .await?
        .json()
        .await
        .map_err(decode_error)?;

    Ok(!rows.is_empty())
}
