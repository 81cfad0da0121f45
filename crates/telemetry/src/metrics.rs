//! Internal metrics collection.
//!
//! Plain atomics; reported as a snapshot on the health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

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

/// Latency histogram with microsecond resolution.
///
/// Handlers here are in-process and mostly sub-millisecond, so the buckets
/// are finer than a network-facing service would use.
#[derive(Debug)]
pub struct LatencyHistogram {
    buckets: [AtomicU64; 10],
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyHistogram {
    /// Upper bounds in microseconds; the last bucket also takes overflow.
    const BOUNDS_MICROS: [u64; 10] = [
        100, 250, 500, 1_000, 2_500, 5_000, 10_000, 50_000, 250_000, 1_000_000,
    ];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.sum_micros.fetch_add(micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let slot = Self::BOUNDS_MICROS
            .iter()
            .position(|&bound| micros <= bound)
            .unwrap_or(Self::BOUNDS_MICROS.len() - 1);
        self.buckets[slot].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean latency in milliseconds, 0 before the first observation.
    pub fn mean_ms(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.sum_micros.load(Ordering::Relaxed) as f64 / n as f64 / 1000.0,
        }
    }

    /// `(upper bound in microseconds, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BOUNDS_MICROS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the tracker.
#[derive(Debug, Default)]
pub struct Metrics {
    // Session metrics
    pub sessions_created: Counter,
    pub sessions_evicted: Counter,
    pub eviction_sweeps: Counter,

    // Access log metrics
    pub requests_logged: Counter,
    pub responses_logged: Counter,
    pub log_fallback_writes: Counter,
    pub log_read_errors: Counter,

    pub response_latency: LatencyHistogram,

    // Gauges
    pub active_sessions: Gauge,
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
    pub sessions_created: u64,
    pub sessions_evicted: u64,
    pub eviction_sweeps: u64,
    pub requests_logged: u64,
    pub responses_logged: u64,
    pub log_fallback_writes: u64,
    pub log_read_errors: u64,
    pub response_latency_mean_ms: f64,
    pub active_sessions: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            sessions_created: self.sessions_created.get(),
            sessions_evicted: self.sessions_evicted.get(),
            eviction_sweeps: self.eviction_sweeps.get(),
            requests_logged: self.requests_logged.get(),
            responses_logged: self.responses_logged.get(),
            log_fallback_writes: self.log_fallback_writes.get(),
            log_read_errors: self.log_read_errors.get(),
            response_latency_mean_ms: self.response_latency.mean_ms(),
            active_sessions: self.active_sessions.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
