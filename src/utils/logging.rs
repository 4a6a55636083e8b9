//! Diagnostic logging
//!
//! The chat window owns the terminal, so tracing output goes to a daily file
//! under `logs/` instead of stderr. The filter comes from `VOLTX_LOG` and
//! defaults to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VOLTX_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// `logs_dir/logs_YYYY-MM-DD.log` for the given day.
pub fn log_file_path<Tz: TimeZone>(logs_dir: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    logs_dir.join(format!("logs_{}.log", now.format("%Y-%m-%d")))
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Returns the log file path on success.
pub fn init(logs_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(logs_dir)?;
    let path = log_file_path(logs_dir, &Local::now());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn log_files_are_named_by_day() {
        let now = Utc.with_ymd_and_hms(2025, 2, 9, 23, 0, 0).unwrap();
        assert_eq!(
            log_file_path(Path::new("/tmp/voltx/logs"), &now),
            PathBuf::from("/tmp/voltx/logs/logs_2025-02-09.log")
        );
    }
}
