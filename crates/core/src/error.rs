//! Unified error types for the site backend.
//!
//! Every error carries an [`ErrorKind`] that decides the HTTP status and
//! whether the message may be shown to the caller:
//! - Validation: 400, message shown verbatim
//! - RateLimited: 429, only the retry-after is exposed
//! - Unauthorized: 401, never says why
//! - NotFound: 404
//! - MethodNotAllowed / UnsupportedMediaType: 405 / 415
//! - Unexpected: 500, detail is logged and replaced with a generic message

use thiserror::Error;

use crate::submission::SubmissionKind;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned for every unexpected failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Message returned when a submitter hits the rate limit.
pub const RATE_LIMITED_MESSAGE: &str = "Too many attempts. Please try again later.";

/// Message returned when a newsletter email is already active.
pub const ALREADY_SUBSCRIBED_MESSAGE: &str = "This email is already subscribed";

/// Error classification, matched exhaustively at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    RateLimited,
    Unauthorized,
    NotFound,
    MethodNotAllowed,
    UnsupportedMediaType,
    Unexpected,
}

impl ErrorKind {
    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::UnsupportedMediaType => 415,
            Self::RateLimited => 429,
            Self::Unexpected => 500,
        }
    }

    /// Whether the error was caused by the client.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Unexpected)
    }
}

/// Unified error type for the site backend.
#[derive(Debug, Error)]
pub enum Error {
    /// A submission payload violated its schema.
    #[error("invalid {kind} submission: {message}")]
    Validation {
        kind: SubmissionKind,
        message: String,
    },

    /// Malformed request outside the submission forms.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Newsletter signup for an email that is already active.
    #[error("email is already subscribed")]
    AlreadySubscribed,

    /// Submitter exceeded the per-window limit.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Caller could not be proven to be an administrator.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    /// Unique constraint violation reported by the store.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("store error: {0}")]
    Store(String),

    /// Failure talking to an outbound collaborator (identity, notifier, page cache).
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(kind: SubmissionKind, msg: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) | Self::AlreadySubscribed => {
                ErrorKind::Validation
            }
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            Self::UnsupportedMediaType => ErrorKind::UnsupportedMediaType,
            Self::DuplicateKey(_)
            | Self::Store(_)
            | Self::Upstream(_)
            | Self::Internal(_) => ErrorKind::Unexpected,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    /// Message that is safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::BadRequest(message) => message.clone(),
            Self::AlreadySubscribed => ALREADY_SUBSCRIBED_MESSAGE.to_string(),
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::NotFound(what) => format!("{} not found", capitalize(what)),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            Self::UnsupportedMediaType => "Content-Type must be application/json".to_string(),
            Self::DuplicateKey(_)
            | Self::Store(_)
            | Self::Upstream(_)
            | Self::Internal(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
