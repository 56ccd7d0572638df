//! Page-cache revalidation after admin mutations.
//!
//! The listing page must be invalidated for the call to succeed. The
//! per-post page is best effort: a failure there is logged and reported, but
//! does not fail the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use site_core::{Error, Result};
use std::time::Duration;
use telemetry::metrics;
use tracing::{debug, info, warn};

/// Path of the public blog listing.
pub const BLOG_LISTING_PATH: &str = "/blog";

/// Header carrying the shared secret expected by the revalidation hook.
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";

/// Path of an individual post page.
pub fn post_path(slug: &str) -> String {
    format!("{}/{}", BLOG_LISTING_PATH, slug)
}

/// Invalidates cached rendered pages.
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn invalidate(&self, path: &str) -> Result<()>;
}

/// Revalidation hook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevalidationConfig {
    /// Front end revalidation endpoint; log-only when unset
    pub url: Option<String>,
    /// Shared secret sent in `x-revalidate-secret`
    pub secret: Option<String>,
}

/// Page cache behind the front end's revalidation hook.
pub struct HttpPageCache {
    http: reqwest::Client,
    url: Option<String>,
    secret: Option<String>,
}

impl HttpPageCache {
    pub fn new(config: &RevalidationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        let url = config.url.clone().filter(|u| !u.trim().is_empty());
        if url.is_none() {
            info!("No revalidation hook configured; invalidations are logged only");
        }

        Ok(Self {
            http,
            url,
            secret: config.secret.clone(),
        })
    }

    /// Whether a hook URL is configured.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl PageCache for HttpPageCache {
    async fn invalidate(&self, path: &str) -> Result<()> {
        let Some(url) = &self.url else {
            debug!(path = %path, "Revalidation hook not configured, skipping");
            return Ok(());
        };

        let mut request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "path": path }));
        if let Some(secret) = &self.secret {
            request = request.header(REVALIDATE_SECRET_HEADER, secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Revalidation hook unavailable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::upstream(format!(
                "Revalidation hook returned {} for {}",
                response.status(),
                path
            )));
        }

        debug!(path = %path, "Invalidated page");
        Ok(())
    }
}

/// Outcome of a revalidation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevalidationReport {
    pub invalidated: Vec<String>,
    pub failed: Vec<String>,
}

/// Invalidate the listing page and, when a slug is given, the post page.
pub async fn revalidate_content(cache: &dyn PageCache, slug: Option<&str>) -> Result<RevalidationReport> {
    let mut report = RevalidationReport::default();

    if let Err(e) = cache.invalidate(BLOG_LISTING_PATH).await {
        metrics().revalidation_failures.inc();
        return Err(e);
    }
    metrics().revalidations.inc();
    report.invalidated.push(BLOG_LISTING_PATH.to_string());

    let slug = slug.map(|s| s.trim().trim_matches('/')).filter(|s| !s.is_empty());
    if let Some(slug) = slug {
        let path = post_path(slug);
        match cache.invalidate(&path).await {
            Ok(()) => {
                metrics().revalidations.inc();
                report.invalidated.push(path);
            }
            Err(e) => {
                metrics().revalidation_failures.inc();
                warn!(path = %path, error = %e, "Failed to invalidate post page");
                report.failed.push(path);
            }
        }
    }

    Ok(report)
}
