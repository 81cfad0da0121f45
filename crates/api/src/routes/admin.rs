//! Admin connection analytics.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracker_core::{
    limits::{DEFAULT_LOG_LIMIT, SUMMARY_SAMPLE_SIZE},
    summarize, SummaryReport,
};

use crate::extractors::AdminUser;
use crate::response::{ActiveSessionsResponse, RecentLogsResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<String>,
}

/// GET /api/admin/connections/active
pub async fn active_sessions_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<ActiveSessionsResponse> {
    Json(ActiveSessionsResponse::new(state.active_sessions()))
}

/// GET /api/admin/connections/logs?limit=N
pub async fn recent_logs_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Json<RecentLogsResponse> {
    let limit = parse_limit(query.limit.as_deref());
    state.log_sink.flush().await;
    let entries = state.log_reader.read_recent(limit).await;
    Json(RecentLogsResponse::new(entries))
}

/// GET /api/admin/connections/summary
pub async fn summary_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<SummaryReport> {
    state.log_sink.flush().await;
    let entries = state.log_reader.read_recent(SUMMARY_SAMPLE_SIZE).await;
    Json(summarize(&state.active_sessions(), &entries))
}

/// Positive integer limit; anything else means the default of 100.
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_LOG_LIMIT)
}
