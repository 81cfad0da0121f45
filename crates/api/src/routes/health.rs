//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, metrics};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Component states, session count and a metrics snapshot.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        access_log_writable: health().access_log.is_healthy(),
        geoip_loaded: state.geo.has_dataset(),
        active_sessions: state.sessions.len(),
        components: report.components,
        metrics: metrics().snapshot(),
    })
}

/// GET /health/ready - 503 while the access log cannot be written.
pub async fn ready_handler() -> StatusCode {
    probe(health().is_ready())
}

/// GET /health/live
pub async fn live_handler() -> StatusCode {
    probe(health().is_alive())
}

fn probe(ok: bool) -> StatusCode {
    if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
