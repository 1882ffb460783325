//! File logging for the terminal front end.
//!
//! Log lines go to a daily rolling file in the application data directory
//! so they never interleave with the status line. Files beyond the 7 most
//! recent are removed at startup.

use crate::{AppError, AppResult, config::project_dirs};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use error_location::ErrorLocation;
use tracing::{debug, warn};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, prelude::*};

const LOG_FILE_PREFIX: &str = "voice-memo.log";
const MAX_LOG_FILES: usize = 7;
const DEFAULT_FILTER: &str = "voice_memo=debug,voice_memo_core=debug";

/// Keeps the non-blocking writer flushing for the program lifetime.
static APPENDER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
#[track_caller]
pub(crate) fn init_logging() -> AppResult<PathBuf> {
    let log_dir = project_dirs()?.data_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD.set(guard).map_err(|_| AppError::LoggingError {
        reason: "Logging already initialized".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    // After init so failed deletions are logged.
    let removed = cleanup_old_logs(&log_dir, MAX_LOG_FILES)?;

    debug!(log_dir = ?log_dir, removed, "Logging initialized");
    Ok(log_dir)
}

/// Deletes rotated log files beyond the `keep` most recently modified.
/// Returns how many were removed.
pub(crate) fn cleanup_old_logs(log_dir: &Path, keep: usize) -> AppResult<usize> {
    let rotated_prefix = format!("{}.", LOG_FILE_PREFIX);

    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let file_name = path.file_name()?.to_string_lossy().into_owned();
            if !file_name.starts_with(&rotated_prefix) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(keep) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = ?path, error = %e, "Failed to delete old log file"),
        }
    }

    Ok(removed)
}
