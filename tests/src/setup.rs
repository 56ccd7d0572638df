//! Common test setup functions.

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use std::sync::Arc;
use telemetry::health;
use uuid::Uuid;

use crate::fixtures::{ADMIN_EMAIL, ADMIN_TOKEN, NO_EMAIL_TOKEN, POST_SLUG, READER_EMAIL, READER_TOKEN};
use crate::mocks::{MockIdentity, MockNotifier, MockPageCache, MockStore};

/// Test context: the real router over in-memory collaborators.
///
/// Comes seeded with one post, one administrator, one plain reader and a
/// user without an email.
pub struct TestContext {
    pub store: MockStore,
    pub identity: MockIdentity,
    pub notifier: MockNotifier,
    pub page_cache: MockPageCache,
    pub post_id: Uuid,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig::default())
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(rate_config: RateLimitConfig) -> Self {
        let store = MockStore::new();
        let identity = MockIdentity::new();
        let notifier = MockNotifier::new();
        let page_cache = MockPageCache::new();

        let post_id = Uuid::new_v4();
        store.add_post(post_id, POST_SLUG);
        store.add_admin(ADMIN_EMAIL);
        identity.add_user(ADMIN_TOKEN, Some(ADMIN_EMAIL));
        identity.add_user(READER_TOKEN, Some(READER_EMAIL));
        identity.add_user(NO_EMAIL_TOKEN, None);

        // Startup probes would have run in production.
        health().store.set_healthy();
        health().page_cache.set_healthy();

        let state = AppState::with_rate_limit(
            Arc::new(store.clone()),
            Arc::new(identity.clone()),
            Arc::new(notifier.clone()),
            Arc::new(page_cache.clone()),
            rate_config,
        );

        Self {
            store,
            identity,
            notifier,
            page_cache,
            post_id,
            router: router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
