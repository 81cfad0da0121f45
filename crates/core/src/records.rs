//! Access log record types.
//!
//! One JSON object per line, tagged by `type`:
//! - `new_session`: first request of a session
//! - `request`: every inbound request
//! - `response`: every completed response, with latency
//!
//! Records are immutable once written. A `response` is not linked to its
//! `request` by any key; consumers correlate by session, url and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Location;
use crate::useragent::{Browser, Device};

/// Message carried by placeholder entries for unparseable lines.
pub const INVALID_LOG_ENTRY: &str = "Invalid log entry";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub ip: String,
    pub browser: Browser,
    pub device: Device,
    pub location: Location,
    pub referer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub ip: String,
    pub method: String,
    pub url: String,
    pub browser: Browser,
    pub device: Device,
    pub referer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub ip: String,
    pub url: String,
    pub status_code: u16,
    /// Milliseconds with two decimals, as a string (e.g. `"12.34"`)
    pub response_time: String,
}

impl ResponseRecord {
    /// Parsed response time, `None` if the stored string is not a number.
    pub fn response_time_ms(&self) -> Option<f64> {
        self.response_time.trim().parse().ok()
    }
}

/// Format a latency in milliseconds the way it is stored.
pub fn format_response_time(millis: f64) -> String {
    format!("{:.2}", millis)
}

/// A structured access log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    NewSession(NewSessionRecord),
    Request(RequestRecord),
    Response(ResponseRecord),
}

impl LogRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewSession(_) => "new_session",
            Self::Request(_) => "request",
            Self::Response(_) => "response",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::NewSession(r) => r.timestamp,
            Self::Request(r) => r.timestamp,
            Self::Response(r) => r.timestamp,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::NewSession(r) => &r.session_id,
            Self::Request(r) => &r.session_id,
            Self::Response(r) => &r.session_id,
        }
    }

    pub fn ip(&self) -> &str {
        match self {
            Self::NewSession(r) => &r.ip,
            Self::Request(r) => &r.ip,
            Self::Response(r) => &r.ip,
        }
    }

    /// Serialize as a single JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Placeholder standing in for a line that failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidEntry {
    pub error: String,
    pub raw: String,
}

/// One line read back from the access log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    Record(LogRecord),
    Invalid(InvalidEntry),
    /// Valid JSON that is not a complete record, passed through as read.
    Partial(serde_json::Value),
}

impl LogEntry {
    /// Parse a line. Lines that are not JSON become placeholders.
    pub fn parse_line(line: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => {
                return Self::Invalid(InvalidEntry {
                    error: INVALID_LOG_ENTRY.to_string(),
                    raw: line.to_string(),
                })
            }
        };

        match LogRecord::deserialize(&value) {
            Ok(record) => Self::Record(record),
            Err(_) => Self::Partial(value),
        }
    }

    /// The `type` tag, for complete and partial entries alike.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Record(record) => Some(record.kind()),
            Self::Partial(value) => value.get("type").and_then(|t| t.as_str()),
            Self::Invalid(_) => None,
        }
    }

    pub fn record(&self) -> Option<&LogRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}
