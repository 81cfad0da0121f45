//! Per-request connection logging.
//!
//! Every request is tied to a cookie session and leaves a `request` record
//! before the handler runs and a `response` record once the status is known.
//! A first visit additionally writes a `new_session` record and sets the
//! cookie. Nothing here can fail the request: log and lookup problems are
//! absorbed by the sink and the resolver.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{
        header::{REFERER, SET_COOKIE, USER_AGENT},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::time::Instant;
use telemetry::metrics;
use tracing::info;
use tracker_core::{
    classify, format_response_time, LogRecord, NewSessionRecord, RequestRecord, ResponseRecord,
};

use crate::cookies;
use crate::extractors::ClientIp;
use crate::state::AppState;

/// Middleware entry point, installed with `from_fn_with_state`.
pub async fn log_connection(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    let now = Utc::now();
    let headers = request.headers();

    let presented = cookies::session_id(headers).map(str::to_string);
    let agent = classify(headers.get(USER_AGENT).and_then(|v| v.to_str().ok()));
    let referer = referer(headers);
    let method = request.method().to_string();
    let url = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.to_string())
        .unwrap_or_else(|| request.uri().to_string());

    let (session, is_new) =
        state
            .sessions
            .get_or_create(presented.as_deref(), &ip, agent, &state.geo, now);

    let m = metrics();

    if is_new {
        m.sessions_created.inc();
        m.active_sessions.set(state.sessions.len() as u64);

        info!(
            session_id = %session.id,
            "[NEW SESSION] {} - {} - {} on {} - {}, {}",
            now.to_rfc3339(),
            ip,
            agent.browser,
            agent.device,
            session.location.country,
            session.location.city,
        );

        state.log_sink.append(&LogRecord::NewSession(NewSessionRecord {
            timestamp: now,
            session_id: session.id.clone(),
            ip: ip.clone(),
            browser: agent.browser,
            device: agent.device,
            location: session.location.clone(),
            referer: referer.clone(),
        }));
    }

    state.log_sink.append(&LogRecord::Request(RequestRecord {
        timestamp: now,
        session_id: session.id.clone(),
        ip: ip.clone(),
        method,
        url: url.clone(),
        browser: agent.browser,
        device: agent.device,
        referer,
    }));
    m.requests_logged.inc();

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed();

    state.log_sink.append(&LogRecord::Response(ResponseRecord {
        timestamp: Utc::now(),
        session_id: session.id.clone(),
        ip,
        url,
        status_code: response.status().as_u16(),
        response_time: format_response_time(elapsed.as_secs_f64() * 1000.0),
    }));
    m.responses_logged.inc();
    m.response_latency.observe(elapsed);

    if is_new {
        if let Some(cookie) = cookies::session_cookie(&session.id, now) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }

    if draw(state.tracking.eviction_probability) {
        state.evict_idle_sessions();
    }

    response
}

/// `Referer`, or its common misspelling `Referrer`, else `-`.
fn referer(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .or_else(|| headers.get("referrer"))
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}

/// True with the given probability.
fn draw(probability: f64) -> bool {
    probability > 0.0 && rand::random::<f64>() < probability
}
