//! Access log writer.
//!
//! The file handle is cached for the process lifetime and reopened only
//! when the calendar day changes, which is what rotates the log at midnight.
//! When the file cannot be opened or written, the record goes to the
//! diagnostic log instead; request handling never sees the failure.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use telemetry::{health, metrics};
use tracing::{error, info, warn};
use tracker_core::LogRecord;

use crate::path::{log_file_path, today};

/// Destination for access log records.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one record. Must not fail or block for long.
    fn append(&self, record: &LogRecord);

    /// Wait until every record appended so far is readable from disk.
    async fn flush(&self) {}
}

struct OpenLog {
    date: NaiveDate,
    file: File,
}

/// Appends records to the day's log file.
pub struct FileLogWriter {
    dir: PathBuf,
    current: Mutex<Option<OpenLog>>,
}

impl FileLogWriter {
    /// Create the log directory and open today's file.
    ///
    /// Failures are reported through the `access_log` health component and
    /// leave the writer in fallback mode until a later open succeeds.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let writer = Self {
            dir,
            current: Mutex::new(None),
        };

        let opened = fs::create_dir_all(&writer.dir)
            .and_then(|_| open_log(&writer.dir, today()));

        match opened {
            Ok(open) => {
                info!(dir = %writer.dir.display(), "Access log ready");
                *writer.current.lock() = Some(open);
                health().access_log.set_healthy();
            }
            Err(e) => {
                error!(dir = %writer.dir.display(), error = %e, "Error creating log stream, falling back to console");
                health().access_log.set_unhealthy(e.to_string());
            }
        }

        writer
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append `record` to the file for `date`.
    pub fn append_on(&self, date: NaiveDate, record: &LogRecord) {
        let line = match record.to_json_line() {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, kind = record.kind(), "Failed to serialize access log record");
                return;
            }
        };

        if let Err(e) = self.write_line(date, &line) {
            fallback(&line, &e);
        }
    }

    fn write_line(&self, date: NaiveDate, line: &str) -> io::Result<()> {
        let mut current = self.current.lock();

        if current.as_ref().map_or(true, |open| open.date != date) {
            *current = None;
            *current = Some(open_log(&self.dir, date)?);
            if !health().access_log.is_healthy() {
                info!(dir = %self.dir.display(), "Access log writable again");
            }
            health().access_log.set_healthy();
        }

        let Some(open) = current.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::Other, "access log not open"));
        };

        // One write per line so concurrent appenders interleave whole lines.
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        if let Err(e) = open.file.write_all(buf.as_bytes()) {
            // Reopen on the next append.
            *current = None;
            return Err(e);
        }

        Ok(())
    }
}

impl LogSink for FileLogWriter {
    fn append(&self, record: &LogRecord) {
        // Path recomputed per write so the file follows the calendar day.
        self.append_on(today(), record);
    }
}

fn open_log(dir: &Path, date: NaiveDate) -> io::Result<OpenLog> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(dir, date))?;
    Ok(OpenLog { date, file })
}

/// Log a record that never reached the writer.
pub(crate) fn console_fallback(record: &LogRecord, reason: &str) {
    metrics().log_fallback_writes.inc();
    match record.to_json_line() {
        Ok(line) => {
            warn!(reason, "Access log record dropped from file, falling back to console");
            info!(target: "access_log", "[LOG] {}", line);
        }
        Err(e) => warn!(error = %e, kind = record.kind(), "Failed to serialize access log record"),
    }
}

fn fallback(line: &str, err: &io::Error) {
    if health().access_log.is_healthy() {
        error!(error = %err, "Access log write failed, falling back to console");
    }
    health().access_log.set_unhealthy(err.to_string());
    metrics().log_fallback_writes.inc();
    info!(target: "access_log", "[LOG] {}", line);
}
