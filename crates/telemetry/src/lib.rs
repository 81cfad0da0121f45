//! Internal telemetry for the PoliQ connection tracker.
//!
//! Diagnostic logging goes through `tracing`. Counters and component health
//! live in process-wide registries and are reported on `/health`.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
