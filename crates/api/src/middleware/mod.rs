//! Request middleware.

pub mod connection_logger;

pub use connection_logger::log_connection;
