use crate::error::{EtlError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

/// Year-Monthname-Day-Hour:Minute:Second, e.g. `2024-Mar-07-14:05:09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%h-%d-%H:%M:%S";

pub const ETL_STARTED: &str = "ETL process started";
pub const ETL_FINISHED: &str = "ETL process finished";
pub const ETL_ABORTED: &str = "ETL process aborted";
pub const EXTRACT_STARTED: &str = "EXTRACTION process started";
pub const EXTRACT_FINISHED: &str = "EXTRACTION process finished";
pub const TRANSFORM_STARTED: &str = "Transformed process started";
pub const TRANSFORM_FINISHED: &str = "Transformed process finished";
pub const LOAD_STARTED: &str = "Load process started";
pub const LOAD_FINISHED: &str = "Load process finished";

/// Append-only `<timestamp>,<message>` log. The file is opened and closed
/// on every call so a crash never loses an earlier stage's line.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, message: &str) -> Result<()> {
        self.log_at(Local::now(), message)
    }

    fn log_at<Tz: TimeZone>(&self, now: DateTime<Tz>, message: &str) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let line = format!("{},{}\n", now.format(TIMESTAMP_FORMAT), message);
        let log_err = |source| EtlError::Log {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(log_err)?;
        file.write_all(line.as_bytes()).map_err(log_err)?;

        info!(progress = message);
        Ok(())
    }
}

/// Split a log line back into its timestamp and message.
pub fn parse_line(line: &str) -> Option<(NaiveDateTime, &str)> {
    let (ts, message) = line.split_once(',')?;
    let ts = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    Some((ts, message))
}
