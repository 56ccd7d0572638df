//! Application state shared across handlers.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use moka::future::Cache;
use notify::{Notifier, PageCache};
use site_core::{BearerToken, Result, SubmissionKind};
use std::sync::Arc;
use std::time::Duration;
use store_client::{ContentStore, IdentityProvider, UserIdentity};
use telemetry::metrics;
use tracing::{debug, info};

/// Cache TTL for resolved identities (30 seconds).
const AUTH_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cache entries.
const AUTH_CACHE_MAX_CAPACITY: u64 = 10_000;

/// How often expired rate limit windows are dropped.
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Resolves bearer tokens to users.
///
/// Answers, including "unknown token", are cached for 30 seconds so that a
/// burst of admin actions costs one identity lookup.
#[derive(Clone)]
pub struct AuthClient {
    identity: Arc<dyn IdentityProvider>,
    /// Token -> resolved user (None for tokens the provider rejected)
    cache: Cache<String, Option<UserIdentity>>,
}

impl AuthClient {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            cache: Cache::builder()
                .max_capacity(AUTH_CACHE_MAX_CAPACITY)
                .time_to_live(AUTH_CACHE_TTL)
                .build(),
        }
    }

    /// Resolve a token, using the cache when possible.
    ///
    /// Transport failures are returned and not cached.
    pub async fn resolve(&self, token: &BearerToken) -> Result<Option<UserIdentity>> {
        if let Some(cached) = self.cache.get(token.as_str()).await {
            debug!("Identity cache hit");
            return Ok(cached);
        }

        let user = self.identity.resolve_user(token).await?;
        self.cache
            .insert(token.as_str().to_string(), user.clone())
            .await;

        Ok(user)
    }
}

/// One limiter per form, so comment, newsletter and contact traffic are
/// counted separately.
#[derive(Clone)]
pub struct RateLimiters {
    pub comment: SharedRateLimiter,
    pub newsletter: SharedRateLimiter,
    pub contact: SharedRateLimiter,
}

impl RateLimiters {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            comment: Arc::new(RateLimiter::new(config.clone())),
            newsletter: Arc::new(RateLimiter::new(config.clone())),
            contact: Arc::new(RateLimiter::new(config)),
        }
    }

    pub fn for_kind(&self, kind: SubmissionKind) -> &RateLimiter {
        match kind {
            SubmissionKind::Comment => &self.comment,
            SubmissionKind::Newsletter => &self.newsletter,
            SubmissionKind::Contact => &self.contact,
        }
    }

    fn all(&self) -> [&RateLimiter; 3] {
        [&self.comment, &self.newsletter, &self.contact]
    }

    /// Tracked identifiers across all forms.
    pub fn total_entries(&self) -> usize {
        self.all().iter().map(|limiter| limiter.len()).sum()
    }

    pub fn purge_expired(&self) -> usize {
        self.all().iter().map(|limiter| limiter.purge_expired()).sum()
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Hosted store in production, in-memory mock in tests
    pub store: Arc<dyn ContentStore>,
    pub auth_client: AuthClient,
    /// Contact message delivery
    pub notifier: Arc<dyn Notifier>,
    /// Front end page cache
    pub page_cache: Arc<dyn PageCache>,
    pub rate_limiters: RateLimiters,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ContentStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        page_cache: Arc<dyn PageCache>,
    ) -> Self {
        Self::with_rate_limit(store, identity, notifier, page_cache, RateLimitConfig::default())
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(
        store: Arc<dyn ContentStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        page_cache: Arc<dyn PageCache>,
        rate_config: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            auth_client: AuthClient::new(identity),
            notifier,
            page_cache,
            rate_limiters: RateLimiters::new(rate_config),
        }
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiters = self.rate_limiters.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let removed = rate_limiters.purge_expired();
                let remaining = rate_limiters.total_entries();
                metrics().rate_limit_entries.set(remaining as u64);
                debug!(removed, remaining, "Purged expired rate limit windows");

                let snapshot = metrics().snapshot();
                info!(
                    received = snapshot.submissions_received,
                    accepted = snapshot.submissions_accepted,
                    rejected = snapshot.validation_failures,
                    rate_limited = snapshot.rate_limited_requests,
                    bots = snapshot.bot_submissions,
                    store_errors = snapshot.store_errors,
                    unauthorized = snapshot.unauthorized_requests,
                    revalidation_failures = snapshot.revalidation_failures,
                    "Submission metrics"
                );
            }
        })
    }
}
