//! Bearer token parsing for admin endpoints.
//!
//! Only the shape of the token is checked here. Resolving it to a user and
//! checking administrator membership is done against the identity
//! collaborator. Every failure maps to [`Error::Unauthorized`] so callers
//! cannot tell a malformed token from a non-admin one.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Characters allowed in access tokens (JWT segments and opaque tokens).
const TOKEN_PATTERN: &str = r"^[A-Za-z0-9\-_.~+/]+=*$";

/// Upper bound on token length.
const MAX_TOKEN_LEN: usize = 4096;

/// Compiled token regex (lazy initialization).
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("invalid token pattern"));

/// Access token taken from an `Authorization: Bearer` header.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    /// Parse and shape-check a raw token.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() || token.len() > MAX_TOKEN_LEN || !TOKEN_REGEX.is_match(token) {
            return Err(Error::Unauthorized);
        }
        Ok(Self(token.to_string()))
    }

    /// Get the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Result<BearerToken> {
    let header = auth_header.ok_or(Error::Unauthorized)?.trim();

    let (scheme, token) = header.split_once(' ').ok_or(Error::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::Unauthorized);
    }

    BearerToken::parse(token)
}

/// Normalize an email for identity comparisons (trimmed, lower-cased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
