//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::{ComponentHealthReport, MetricsSnapshot};
use tracker_core::{ActiveSession, LogEntry, SessionStats};

/// Plain `{ "message": ... }` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /api/admin/connections/active
#[derive(Debug, Serialize)]
pub struct ActiveSessionsResponse {
    pub stats: SessionStats,
    pub sessions: Vec<ActiveSession>,
}

impl ActiveSessionsResponse {
    pub fn new(sessions: Vec<ActiveSession>) -> Self {
        Self {
            stats: SessionStats::from_sessions(&sessions),
            sessions,
        }
    }
}

/// Entries grouped by their `type` tag. Placeholders for unreadable lines
/// and entries without a known tag belong to no group.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedLogs {
    pub new_sessions: Vec<LogEntry>,
    pub requests: Vec<LogEntry>,
    pub responses: Vec<LogEntry>,
}

/// GET /api/admin/connections/logs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentLogsResponse {
    /// Entries read, placeholders included
    pub total: usize,
    pub grouped_logs: GroupedLogs,
}

impl RecentLogsResponse {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        let total = entries.len();
        let mut grouped = GroupedLogs::default();

        for entry in entries {
            let group = match entry.kind() {
                Some("new_session") => &mut grouped.new_sessions,
                Some("request") => &mut grouped.requests,
                Some("response") => &mut grouped.responses,
                _ => continue,
            };
            group.push(entry);
        }

        Self {
            total,
            grouped_logs: grouped,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub access_log_writable: bool,
    pub geoip_loaded: bool,
    pub active_sessions: usize,
    pub components: Vec<ComponentHealthReport>,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error type with error codes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_001", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<tracker_core::Error> for ApiError {
    fn from(err: tracker_core::Error) -> Self {
        match err {
            tracker_core::Error::Auth {
                code,
                message,
                http_status,
            } => {
                let status =
                    StatusCode::from_u16(http_status).unwrap_or(StatusCode::UNAUTHORIZED);
                ApiError::with_code(status, code, message)
            }
            tracker_core::Error::Config(msg) => ApiError::bad_request(msg),
            other => ApiError::internal(other.to_string()),
        }
    }
}
