//! PoliQ connection tracker
//!
//! HTTP backend that ties every request to a cookie session and records it:
//! - Session store keyed by the `sessionId` cookie, with idle eviction
//! - Browser/device classification and optional MaxMind geolocation
//! - Daily JSON-lines access log with console fallback
//! - Admin analytics over live sessions and recent log records

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use validator::Validate;

use access_log::{FileLogWriter, QueuedLogWriter, DEFAULT_QUEUE_CAPACITY};
use api::{router, AppState};
use telemetry::{health, init_tracing_from_env};
use tracker_core::{GeoResolver, TrackingConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// HS256 secret for admin bearer tokens
    #[serde(default = "default_jwt_secret")]
    jwt_secret: String,

    /// Browser origin allowed to send credentials
    #[serde(default = "default_cors_origin")]
    cors_origin: String,

    #[serde(default)]
    tracking: TrackingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_jwt_secret() -> String {
    "change-me".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            cors_origin: default_cors_origin(),
            tracking: TrackingConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting PoliQ connection tracker v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    config
        .tracking
        .validate()
        .context("Invalid tracking configuration")?;

    if config.jwt_secret == default_jwt_secret() {
        warn!("Using the default JWT secret; set POLIQ__JWT_SECRET in production");
    }

    let geo = GeoResolver::from_path(config.tracking.geoip_path.as_deref());
    if geo.has_dataset() {
        health().geoip.set_healthy();
        info!("GeoIP database loaded");
    } else {
        health()
            .geoip
            .set_unhealthy("No GeoIP database, locations resolve to Unknown");
    }

    let (log_writer, _log_thread) = QueuedLogWriter::spawn(
        FileLogWriter::new(&config.tracking.logs_dir),
        DEFAULT_QUEUE_CAPACITY,
    )
    .context("Failed to start access log writer")?;

    let state = AppState::new(
        config.tracking.clone(),
        geo,
        Arc::new(log_writer),
        config.jwt_secret.clone(),
    )
    .with_cors_origin(config.cors_origin.clone());

    let _sweep = config.tracking.sweep_interval().map(|every| {
        info!(every_secs = every.as_secs(), "Started session sweep task");
        state.start_session_sweep(every)
    });

    let app = router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Peer addresses back the client IP when no proxy header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    state.log_sink.flush().await;
    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("POLIQ")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate's nested parsing doesn't work reliably with underscored
    // field names, so the common settings also have flat variables.
    if let Ok(secret) = std::env::var("POLIQ_JWT_SECRET").or_else(|_| std::env::var("JWT_SECRET")) {
        config.jwt_secret = secret;
    }
    if let Ok(origin) = std::env::var("POLIQ_CORS_ORIGIN") {
        config.cors_origin = origin;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.port = port.parse().context("PORT must be a port number")?;
    }
    if let Ok(dir) = std::env::var("POLIQ_LOGS_DIR") {
        config.tracking.logs_dir = dir.into();
    }
    if let Ok(path) = std::env::var("POLIQ_GEOIP_PATH") {
        config.tracking.geoip_path = Some(path);
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
