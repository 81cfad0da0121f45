//! Core types for PoliQ connection tracking: user agent classification,
//! geolocation, live sessions, access log records and admin analytics.

pub mod config;
pub mod error;
pub mod geo;
pub mod limits;
pub mod records;
pub mod session;
pub mod summary;
pub mod useragent;

pub use config::TrackingConfig;
pub use error::{AuthErrorCode, Error, Result};
pub use geo::{GeoLookup, GeoRecord, GeoResolver, Location, MaxMindLookup};
pub use records::*;
pub use session::*;
pub use summary::*;
pub use useragent::{classify, Browser, ClientAgent, Device};
