//! Per-client submission rate limiting.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use site_core::limits::{DEFAULT_MAX_SUBMISSIONS, DEFAULT_WINDOW_MS, MAX_WINDOW_MS};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions allowed per window
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,
    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_max_submissions() -> u32 {
    DEFAULT_MAX_SUBMISSIONS
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_ms: default_window_ms(),
        }
    }
}

impl RateLimitConfig {
    /// Window length, clamped to one day.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.min(MAX_WINDOW_MS))
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Seconds until the window resets, rounded up. Zero when allowed.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::Allowed { .. } => 0,
            Self::Limited { retry_after } => retry_after.as_millis().div_ceil(1000) as u64,
        }
    }
}

struct Window {
    count: u32,
    expires_at: Instant,
}

/// Fixed-window counter keyed by client identifier.
///
/// State is per process, so several instances behind a load balancer each
/// allow the full quota.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Count a submission for `identifier`.
    ///
    /// Requests without an identifier are always allowed.
    pub fn check(&self, identifier: Option<&str>) -> RateLimitResult {
        self.check_at(identifier, Instant::now())
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading.
    pub fn check_at(&self, identifier: Option<&str>, now: Instant) -> RateLimitResult {
        let max = self.config.max_submissions;
        let Some(identifier) = identifier.map(str::trim).filter(|id| !id.is_empty()) else {
            return RateLimitResult::Allowed { remaining: max };
        };

        let mut windows = self.windows.lock();
        match windows.get_mut(identifier) {
            Some(window) if now < window.expires_at => {
                if window.count < max {
                    window.count += 1;
                    RateLimitResult::Allowed {
                        remaining: max - window.count,
                    }
                } else {
                    RateLimitResult::Limited {
                        retry_after: window.expires_at - now,
                    }
                }
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    Window {
                        count: 1,
                        expires_at: now + self.config.window(),
                    },
                );
                RateLimitResult::Allowed {
                    remaining: max.saturating_sub(1),
                }
            }
        }
    }

    /// Drop expired windows. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, window| now < window.expires_at);
        before - windows.len()
    }

    /// Number of tracked identifiers, expired or not.
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
