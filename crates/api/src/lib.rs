//! HTTP layer for the connection tracker.

pub mod auth;
pub mod cookies;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::{AdminAuth, Claims};
pub use routes::router;
pub use state::AppState;
