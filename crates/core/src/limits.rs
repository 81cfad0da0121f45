//! Fixed constants for session tracking and log sampling.

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "sessionId";

/// Cookie max age in seconds (24 hours).
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Idle window after which a session is evicted (hours).
pub const SESSION_RETENTION_HOURS: u64 = 24;

/// Per-request probability of running an eviction sweep.
pub const EVICTION_PROBABILITY: f64 = 0.01;

/// Records returned by the logs endpoint when no usable limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Records sampled for the summary report.
///
/// Summary numbers are sample statistics over this window, not totals since
/// the log file was created.
pub const SUMMARY_SAMPLE_SIZE: usize = 1000;

/// Number of entries kept in the popular endpoints ranking.
pub const TOP_ENDPOINTS: usize = 10;

/// Placeholder used by the user agent, geo and referer lookups.
pub const UNKNOWN: &str = "Unknown";
