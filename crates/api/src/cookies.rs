//! Session cookie handling.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};
use tracker_core::limits::{SESSION_COOKIE, SESSION_COOKIE_MAX_AGE_SECS};

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// The session identifier presented by the client, if any.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    read_cookie(headers, SESSION_COOKIE)
}

/// `Set-Cookie` value establishing a session: HTTP-only, 24 hours.
pub fn session_cookie(id: &str, now: DateTime<Utc>) -> Option<HeaderValue> {
    let expires = now + Duration::seconds(SESSION_COOKIE_MAX_AGE_SECS);
    let cookie = format!(
        "{SESSION_COOKIE}={id}; Max-Age={SESSION_COOKIE_MAX_AGE_SECS}; Path=/; Expires={}; HttpOnly",
        expires.format("%a, %d %b %Y %H:%M:%S GMT"),
    );
    HeaderValue::from_str(&cookie).ok()
}
