//! In-process metrics.
//!
//! Counters are plain atomics read through [`Metrics::snapshot`]. The
//! snapshot is served under `metrics` by `GET /health` and logged by the
//! rate limiter purge task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, +Inf
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 10] = [5, 10, 25, 50, 100, 250, 500, 1000, 2500, 5000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    /// Bucket counts as (upper bound, count); the overflow bucket has bound `u64::MAX`.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .copied()
            .chain(std::iter::once(u64::MAX))
            .zip(self.buckets.iter())
            .map(|(bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the site backend.
#[derive(Debug, Default)]
pub struct Metrics {
    // Submission pipeline
    pub submissions_received: Counter,
    pub submissions_accepted: Counter,
    pub validation_failures: Counter,
    pub rate_limited_requests: Counter,
    pub bot_submissions: Counter,
    pub store_errors: Counter,

    // Admin
    pub unauthorized_requests: Counter,
    pub revalidations: Counter,
    pub revalidation_failures: Counter,

    pub submit_latency_ms: Histogram,

    /// Live entries across all rate limiters, refreshed by the purge task.
    pub rate_limit_entries: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub submissions_received: u64,
    pub submissions_accepted: u64,
    pub validation_failures: u64,
    pub rate_limited_requests: u64,
    pub bot_submissions: u64,
    pub store_errors: u64,
    pub unauthorized_requests: u64,
    pub revalidations: u64,
    pub revalidation_failures: u64,
    pub submit_latency_mean_ms: f64,
    pub rate_limit_entries: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            submissions_received: self.submissions_received.get(),
            submissions_accepted: self.submissions_accepted.get(),
            validation_failures: self.validation_failures.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            bot_submissions: self.bot_submissions.get(),
            store_errors: self.store_errors.get(),
            unauthorized_requests: self.unauthorized_requests.get(),
            revalidations: self.revalidations.get(),
            revalidation_failures: self.revalidation_failures.get(),
            submit_latency_mean_ms: self.submit_latency_ms.mean(),
            rate_limit_entries: self.rate_limit_entries.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
