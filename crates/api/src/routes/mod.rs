//! API routes.

pub mod admin;
pub mod health;
pub mod public;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::middleware::log_connection;
use crate::state::AppState;

/// Creates the API router.
///
/// Every route, the fallback included, passes through the connection
/// logger.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin.as_deref());

    let admin = Router::new()
        .route("/active", get(admin::active_sessions_handler))
        .route("/logs", get(admin::recent_logs_handler))
        .route("/summary", get(admin::summary_handler));

    Router::new()
        .route("/", get(public::root_handler))
        .route("/api/test", get(public::test_handler))
        .nest("/api/admin/connections", admin)
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .fallback(public::not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), log_connection))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    let Ok(origin) = HeaderValue::from_str(origin) else {
        warn!(origin, "Invalid CORS origin, cross-origin requests disabled");
        return CorsLayer::new();
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}
