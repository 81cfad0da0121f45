//! Access log storage.
//!
//! One newline-delimited JSON file per calendar day (local clock):
//! `<logs-dir>/access-YYYY-MM-DD.log`. Appends never fail or block the caller;
//! reads tolerate corrupt lines.

pub mod path;
pub mod queue;
pub mod reader;
pub mod writer;

pub use path::{log_file_name, log_file_path, today};
pub use queue::{QueuedLogWriter, DEFAULT_QUEUE_CAPACITY};
pub use reader::LogReader;
pub use writer::{FileLogWriter, LogSink};
