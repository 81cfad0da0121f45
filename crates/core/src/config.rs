//! Connection tracking configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::limits::{EVICTION_PROBABILITY, SESSION_RETENTION_HOURS};

/// Tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackingConfig {
    /// Directory holding the `access-YYYY-MM-DD.log` files
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Optional MaxMind City database (.mmdb)
    #[serde(default)]
    pub geoip_path: Option<String>,

    /// Idle time before a session is evicted, at most ten years
    #[serde(default = "default_retention_hours")]
    #[validate(range(min = 1, max = 87_600))]
    pub session_retention_hours: u64,

    /// Chance that a request triggers an eviction sweep
    #[serde(default = "default_eviction_probability")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub eviction_probability: f64,

    /// Periodic sweep interval; 0 leaves eviction to the per-request draw
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_retention_hours() -> u64 {
    SESSION_RETENTION_HOURS
}

fn default_eviction_probability() -> f64 {
    EVICTION_PROBABILITY
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            geoip_path: None,
            session_retention_hours: default_retention_hours(),
            eviction_probability: default_eviction_probability(),
            sweep_interval_secs: 0,
        }
    }
}

impl TrackingConfig {
    /// Saturates instead of overflowing when the config skipped validation.
    pub fn retention_window(&self) -> Duration {
        i64::try_from(self.session_retention_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX)
    }

    pub fn sweep_interval(&self) -> Option<std::time::Duration> {
        (self.sweep_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.sweep_interval_secs))
    }
}
