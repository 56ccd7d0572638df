//! Standardized API responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use site_core::{Error, ErrorKind};
use telemetry::MetricsSnapshot;
use tracing::error;

/// `{success: true}` envelope, optionally flagging a completed revalidation.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revalidated: Option<bool>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            revalidated: None,
        }
    }

    pub fn revalidated() -> Self {
        Self {
            success: true,
            revalidated: Some(true),
        }
    }
}

/// Outcome of a public submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResponse {
    /// Stored or forwarded: 200 `{success: true}`.
    Accepted,
    /// Honeypot filled: 204 with an empty body, nothing stored.
    Discarded,
}

impl IntoResponse for SubmitResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => Json(SuccessResponse::ok()).into_response(),
            Self::Discarded => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Administrator lookup result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub is_admin: bool,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub page_cache_connected: bool,
    pub rate_limit_entries: usize,
    pub metrics: MetricsSnapshot,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Error returned from handlers and extractors.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg),
            retry_after: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.response.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let retry_after = match err.kind() {
            ErrorKind::RateLimited => match &err {
                Error::RateLimited { retry_after_secs } => Some(*retry_after_secs),
                _ => None,
            },
            ErrorKind::Unexpected => {
                // Detail stays in the logs; the caller gets the generic message.
                error!(error = %err, "Request failed");
                None
            }
            ErrorKind::Validation
            | ErrorKind::Unauthorized
            | ErrorKind::NotFound
            | ErrorKind::MethodNotAllowed
            | ErrorKind::UnsupportedMediaType => None,
        };

        Self {
            status,
            response: ErrorResponse::new(err.public_message()),
            retry_after,
        }
    }
}
