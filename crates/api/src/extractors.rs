//! Request extractors.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use site_core::{extract_bearer_token, Error};
use std::net::{IpAddr, SocketAddr};
use telemetry::metrics;
use tracing::debug;
use uuid::Uuid;

use crate::response::ApiError;
use crate::state::AppState;

/// Caller proven to be an administrator.
///
/// Every way of failing the check produces the same 401 so the response
/// does not reveal whether a token or an account exists.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user_id: Uuid,
    /// Lower-cased email that matched the administrator list
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = extract_bearer_token(auth_header).map_err(unauthorized)?;

        let user = state
            .auth_client
            .resolve(&token)
            .await?
            .ok_or_else(|| unauthorized(Error::Unauthorized))?;

        let email = user
            .email
            .as_deref()
            .map(site_core::normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| unauthorized(Error::Unauthorized))?;

        if !state.store.is_admin(&email).await? {
            debug!(user_id = %user.id, "Authenticated user is not an administrator");
            return Err(unauthorized(Error::Unauthorized));
        }

        Ok(AdminContext {
            user_id: user.id,
            email,
        })
    }
}

fn unauthorized(err: Error) -> ApiError {
    metrics().unauthorized_requests.inc();
    err.into()
}

/// Client IP address, used as the rate limit identifier.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Try X-Forwarded-For first (for proxied requests)
        if let Some(xff) = parts.headers.get("X-Forwarded-For") {
            if let Ok(xff_str) = xff.to_str() {
                // Take the first IP in the chain
                if let Some(ip) = xff_str.split(',').next().and_then(normalize_ip) {
                    return Ok(ClientIp(Some(ip)));
                }
            }
        }

        if let Some(real_ip) = parts.headers.get("X-Real-IP") {
            if let Some(ip) = real_ip.to_str().ok().and_then(normalize_ip) {
                return Ok(ClientIp(Some(ip)));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .and_then(|ConnectInfo(addr)| normalize_ip(&addr.ip().to_string()));

        Ok(ClientIp(peer))
    }
}

/// Trim an address and unwrap IPv4-mapped IPv6 (`::ffff:a.b.c.d`).
///
/// Values that do not parse as an IP are kept as-is; blank values are `None`.
pub fn normalize_ip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => Some(v4.to_string()),
            None => Some(v6.to_string()),
        },
        Ok(IpAddr::V4(v4)) => Some(v4.to_string()),
        Err(_) => Some(trimmed.to_string()),
    }
}
