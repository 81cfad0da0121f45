//! Unified error types for connection tracking.
//!
//! Most failures inside the tracking pipeline are absorbed where they happen
//! (fallback writes, "Unknown" lookups, placeholder records). The variants
//! here surface at the edges: startup, admin authorization, and the inner
//! `try_*` helpers whose callers decide how to degrade.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Authorization error codes returned by the admin endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// AUTH_001: no bearer token supplied
    MissingToken,
    /// AUTH_002: token malformed, badly signed or expired
    InvalidToken,
    /// AUTH_003: token valid but the role is not admin
    NotAdmin,
}

impl AuthErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "AUTH_001",
            Self::InvalidToken => "AUTH_002",
            Self::NotAdmin => "AUTH_003",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingToken => 401,
            Self::InvalidToken => 401,
            Self::NotAdmin => 403,
        }
    }
}

/// Unified error type for the tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// Authorization error with code.
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("geoip database error: {0}")]
    GeoDatabase(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authorization error.
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn geo(msg: impl Into<String>) -> Self {
        Self::GeoDatabase(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth { http_status, .. } => *http_status,
            Self::Config(_) => 400,
            Self::Io(_)
            | Self::Serialization(_)
            | Self::GeoDatabase(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Auth { code, .. } => Some(code),
            _ => None,
        }
    }
}
