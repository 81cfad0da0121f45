//! Log file naming.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// `access-YYYY-MM-DD.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("access-{}.log", date.format("%Y-%m-%d"))
}

pub fn log_file_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(log_file_name(date))
}

/// Current calendar day on the process-local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
