//! HTTP client wrapper for the hosted backend.

use crate::config::StoreConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use site_core::{BearerToken, Error, Result};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Postgres unique-violation SQLSTATE, surfaced by the REST layer.
const UNIQUE_VIOLATION: &str = "23505";

/// Error body returned by the REST layer.
#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Hosted backend client.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: Url,
    config: StoreConfig,
}

impl StoreClient {
    /// Creates a new store client.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.url)
            .map_err(|e| Error::internal(format!("Invalid store URL {}: {}", config.url, e)))?;

        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        if config.service_key.is_none() {
            warn!("No store service key configured; data calls are unauthenticated");
        }

        info!(url = %base_url, "Created store client");

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::internal(format!("Invalid store path {}: {}", path, e)))
    }

    /// Request against a REST table, authenticated with the service key.
    pub fn rest(&self, method: Method, table: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let mut request = self.http.request(method, url);

        if let Some(key) = &self.config.service_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        Ok(request)
    }

    /// Request against the auth API on behalf of the caller's token.
    pub fn auth(&self, method: Method, path: &str, token: &BearerToken) -> Result<RequestBuilder> {
        let url = self.endpoint(&format!("auth/v1/{}", path))?;
        let mut request = self.http.request(method, url).bearer_auth(token.as_str());

        if let Some(key) = self.config.anon_key.as_ref().or(self.config.service_key.as_ref()) {
            request = request.header("apikey", key);
        }

        Ok(request)
    }

    /// Send a data request and turn non-success statuses into errors.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::store(format!("Store request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(rest_error(status, &body))
    }
}

/// Map a failed REST response to an error.
pub(crate) fn rest_error(status: StatusCode, body: &str) -> Error {
    let parsed: RestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.details)
        .unwrap_or_else(|| body.to_string());

    // 409 also covers foreign key violations; trust the SQLSTATE when present.
    let duplicate = match parsed.code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => status == StatusCode::CONFLICT,
    };
    if duplicate {
        return Error::DuplicateKey(message);
    }

    Error::store(format!("Store returned {}: {}", status, message))
}

/// Map a body decoding failure.
pub(crate) fn decode_error(e: reqwest::Error) -> Error {
    Error::store(format!("Invalid store response: {}", e))
}
