//! Application state shared across handlers.

use access_log::{LogReader, LogSink};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;
use tracker_core::{ActiveSession, GeoResolver, SessionStore, TrackingConfig};

use crate::auth::AdminAuth;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions keyed by cookie identifier
    pub sessions: Arc<SessionStore>,
    /// Location lookup for new sessions
    pub geo: Arc<GeoResolver>,
    /// Access log destination (daily file in production, capture in tests)
    pub log_sink: Arc<dyn LogSink>,
    /// Reads back today's log for the admin endpoints
    pub log_reader: LogReader,
    /// Bearer token verification for `/api/admin`
    pub auth: AdminAuth,
    /// Idle window and eviction draw
    pub tracking: Arc<TrackingConfig>,
    /// Single browser origin allowed to send credentials
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(
        tracking: TrackingConfig,
        geo: GeoResolver,
        log_sink: Arc<dyn LogSink>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            geo: Arc::new(geo),
            log_sink,
            log_reader: LogReader::new(tracking.logs_dir.clone()),
            auth: AdminAuth::new(jwt_secret),
            tracking: Arc::new(tracking),
            cors_origin: None,
        }
    }

    /// Restrict CORS to one origin with credentials.
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = Some(origin.into());
        self
    }

    /// Live sessions with their current duration.
    pub fn active_sessions(&self) -> Vec<ActiveSession> {
        self.sessions.snapshot(Utc::now())
    }

    /// Drop sessions idle longer than the retention window.
    pub fn evict_idle_sessions(&self) -> usize {
        let removed = self
            .sessions
            .evict_older_than(Utc::now(), self.tracking.retention_window());

        let m = metrics();
        m.eviction_sweeps.inc();
        m.sessions_evicted.inc_by(removed as u64);
        m.active_sessions.set(self.sessions.len() as u64);

        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        removed
    }

    /// Start the periodic eviction task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_session_sweep(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                state.evict_idle_sessions();
            }
        })
    }
}
