//! Site backend
//!
//! Public submission pipeline and admin hooks for the consultancy site:
//! - Blog comments (stored for moderation)
//! - Newsletter signups
//! - Contact messages (forwarded to the owners)
//! - Comment moderation and page cache revalidation for administrators

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use notify::{HttpPageCache, NotificationConfig, NotificationWorker, RevalidationConfig};
use site_core::limits::MAX_WINDOW_MS;
use store_client::{ContentStore, StoreClient, StoreConfig};
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    rate_limit: RateLimitConfig,

    #[serde(default)]
    notifications: NotificationConfig,

    #[serde(default)]
    revalidation: RevalidationConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreConfig::default(),
            rate_limit: RateLimitConfig::default(),
            notifications: NotificationConfig::default(),
            revalidation: RevalidationConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting site backend v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        store_url = %config.store.url,
        rate_limit_max = config.rate_limit.max_submissions,
        rate_limit_window_ms = config.rate_limit.window_ms,
        "Loaded configuration"
    );

    let store = Arc::new(
        StoreClient::new(config.store.clone()).context("Failed to create store client")?,
    );

    let notifier = Arc::new(
        NotificationWorker::from_config(&config.notifications)
            .context("Failed to create contact notifier")?,
    );

    let page_cache = Arc::new(
        HttpPageCache::new(&config.revalidation).context("Failed to create page cache client")?,
    );

    check_health(store.as_ref(), &page_cache).await;

    let state = AppState::with_rate_limit(
        store.clone(),
        store,
        notifier,
        page_cache,
        config.rate_limit.clone(),
    );

    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task (every 5 minutes)");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Peer address is the rate limit key of last resort
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("SITE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate splits on '_' inside field names, so the common
    // settings are also read from flat variables.
    if let Ok(url) = std::env::var("SITE_STORE_URL") {
        config.store.url = url;
    }
    if let Ok(key) = std::env::var("SITE_STORE_SERVICE_KEY") {
        config.store.service_key = Some(key);
    }
    if let Ok(key) = std::env::var("SITE_STORE_ANON_KEY") {
        config.store.anon_key = Some(key);
    }

    if let Ok(max) = std::env::var("SITE_RATE_LIMIT_MAX") {
        config.rate_limit.max_submissions = max
            .trim()
            .parse()
            .context("SITE_RATE_LIMIT_MAX must be a positive integer")?;
    }
    if let Ok(window) = std::env::var("SITE_RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.window_ms = window
            .trim()
            .parse()
            .context("SITE_RATE_LIMIT_WINDOW_MS must be a number of milliseconds")?;
    }

    if let Ok(url) = std::env::var("SITE_REVALIDATE_URL") {
        config.revalidation.url = Some(url);
    }
    if let Ok(secret) = std::env::var("SITE_REVALIDATE_SECRET") {
        config.revalidation.secret = Some(secret);
    }

    if let Ok(url) = std::env::var("SITE_CONTACT_WEBHOOK_URL") {
        config.notifications.webhook_url = Some(url);
    }

    if config.rate_limit.max_submissions == 0 {
        anyhow::bail!("rate_limit.max_submissions must be at least 1");
    }
    if config.rate_limit.window_ms > MAX_WINDOW_MS {
        warn!(
            window_ms = config.rate_limit.window_ms,
            max_window_ms = MAX_WINDOW_MS,
            "Rate limit window too long, clamping"
        );
        config.rate_limit.window_ms = MAX_WINDOW_MS;
    }

    Ok(config)
}

/// Check component health on startup.
async fn check_health(store: &dyn ContentStore, page_cache: &HttpPageCache) {
    let store_healthy = store.is_healthy().await;
    health().store.record(store_healthy, "Connection failed");
    if store_healthy {
        info!("Store connection: healthy");
    } else {
        error!("Store connection: unhealthy");
    }

    let hook_configured = page_cache.is_configured();
    health()
        .page_cache
        .record(hook_configured, "Revalidation hook not configured");
    if hook_configured {
        info!("Revalidation hook: configured");
    } else {
        warn!("Revalidation hook: not configured, pages are refreshed on their own schedule");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
