//! Request extractors.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::net::SocketAddr;
use tracker_core::limits::UNKNOWN;

use crate::auth::Claims;
use crate::response::ApiError;
use crate::state::AppState;

/// A caller holding a valid admin token.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let claims = state.auth.authorize_admin(auth_header)?;
        Ok(AdminUser(claims))
    }
}

/// Client address as logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp(client_ip(&parts.headers, remote)))
    }
}

/// Resolve the client address.
///
/// `X-Forwarded-For` wins, then `X-Real-IP`, then the socket peer. Whatever
/// is chosen is cut at the first comma, so only the originating hop of a
/// proxy chain is kept.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    let raw = header_value(headers, "x-forwarded-for")
        .or_else(|| header_value(headers, "x-real-ip"))
        .map(str::to_string)
        .or_else(|| remote.map(|addr| addr.ip().to_canonical().to_string()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let first = raw.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        UNKNOWN.to_string()
    } else {
        first.to_string()
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}
