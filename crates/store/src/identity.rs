//! Access token resolution against the hosted auth API.

use crate::client::StoreClient;
use crate::models::UserIdentity;
use reqwest::{Method, StatusCode};
use site_core::{BearerToken, Error, Result};
use tracing::{debug, warn};

/// Resolve a bearer token to the user it was issued for.
///
/// Returns `Ok(None)` when the auth API does not recognize the token.
pub async fn resolve_user(client: &StoreClient, token: &BearerToken) -> Result<Option<UserIdentity>> {
    let request = client.auth(Method::GET, "user", token)?;

    let response = request.send().await.map_err(|e| {
        warn!(error = %e, "Auth API request failed");
        Error::upstream(format!("Auth API unavailable: {}", e))
    })?;

    match response.status() {
        status if status.is_success() => {
            let user: UserIdentity = response.json().await.map_err(|e| {
                warn!(error = %e, "Failed to parse auth API response");
                Error::upstream(format!("Invalid auth API response: {}", e))
            })?;
            Ok(Some(user))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            debug!("Access token not recognized");
            Ok(None)
        }
        status => {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Auth API returned error");
            Err(Error::upstream(format!("Auth API returned {}", status)))
        }
    }
}
