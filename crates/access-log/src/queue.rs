//! Background access log writer.
//!
//! Request handlers push records onto a bounded queue and return at once.
//! A dedicated thread owns the [`FileLogWriter`] and does the blocking file
//! I/O, so a slow disk never stalls the async workers. When the queue is full
//! the record goes to the console instead.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::io;
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use tracker_core::LogRecord;

use crate::path::today;
use crate::writer::{console_fallback, FileLogWriter, LogSink};

/// Records that may wait for the writer thread before appends spill.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

enum Command {
    /// The date is taken at append time so a record queued just before
    /// midnight still lands in that day's file.
    Append { date: NaiveDate, record: LogRecord },
    Flush(oneshot::Sender<()>),
}

/// [`LogSink`] handing records to a writer thread.
pub struct QueuedLogWriter {
    tx: mpsc::Sender<Command>,
}

impl QueuedLogWriter {
    /// Start the writer thread.
    ///
    /// The thread exits once every `QueuedLogWriter` handle is dropped and
    /// the queue has drained.
    pub fn spawn(writer: FileLogWriter, capacity: usize) -> io::Result<(Self, JoinHandle<()>)> {
        let (tx, mut rx) = mpsc::channel(capacity.max(1));

        let handle = thread::Builder::new()
            .name("access-log".into())
            .spawn(move || {
                while let Some(command) = rx.blocking_recv() {
                    match command {
                        Command::Append { date, record } => writer.append_on(date, &record),
                        Command::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
                debug!("Access log queue closed");
            })?;

        Ok((Self { tx }, handle))
    }
}

#[async_trait]
impl LogSink for QueuedLogWriter {
    fn append(&self, record: &LogRecord) {
        let command = Command::Append {
            date: today(),
            record: record.clone(),
        };

        match self.tx.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                console_fallback(record, "access log queue full")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                console_fallback(record, "access log writer stopped")
            }
        }
    }

    async fn flush(&self) {
        let (done, written) = oneshot::channel();
        if self.tx.send(Command::Flush(done)).await.is_ok() {
            let _ = written.await;
        }
    }
}
