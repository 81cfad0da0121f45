//! Access log reader.

use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use telemetry::metrics;
use tracing::error;
use tracker_core::{LogEntry, Result};

use crate::path::{log_file_path, today};

/// Reads recent records from the day's log file.
#[derive(Debug, Clone)]
pub struct LogReader {
    dir: PathBuf,
}

impl LogReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The last `limit` entries of today's log, oldest first.
    ///
    /// A missing file (fresh deployment) or a read error yields an empty list.
    pub async fn read_recent(&self, limit: usize) -> Vec<LogEntry> {
        self.read_recent_on(today(), limit).await
    }

    /// Same as [`read_recent`](Self::read_recent) for a given day.
    pub async fn read_recent_on(&self, date: NaiveDate, limit: usize) -> Vec<LogEntry> {
        match self.try_read_recent(date, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "Error reading logs");
                metrics().log_read_errors.inc();
                Vec::new()
            }
        }
    }

    pub async fn try_read_recent(&self, date: NaiveDate, limit: usize) -> Result<Vec<LogEntry>> {
        let path = log_file_path(&self.dir, date);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // Invalid UTF-8 only spoils the lines it appears in.
        let content = String::from_utf8_lossy(&bytes);
        Ok(recent_entries(&content, limit))
    }
}

/// Parse the last `limit` non-blank lines of `content`.
pub fn recent_entries(content: &str, limit: usize) -> Vec<LogEntry> {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let start = lines.len().saturating_sub(limit);
    lines[start..]
        .iter()
        .map(|line| LogEntry::parse_line(line))
        .collect()
}
