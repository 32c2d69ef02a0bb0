//! Rolling file logger for adapters embedding the crate.
//!
//! The library itself only speaks the `log` facade; an application calls
//! [`init_logging`] once to route those records to disk.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "servint";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Logger setup failure.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Level is not one of `error`, `warn`, `info`, `debug`, `trace`.
    #[error("unsupported log level `{0}`")]
    Level(String),
    /// Logging already runs with another level or directory.
    #[error("logging already initialized with level `{level}` at `{dir}`")]
    AlreadyInitialized {
        /// Active level.
        level: String,
        /// Active directory.
        dir: String,
    },
    /// Directory could not be created.
    #[error("cannot create log directory `{dir}`: {source}")]
    Dir {
        /// Requested directory.
        dir: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The logger backend refused to start.
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
}

/// Starts size-rotated file logging in `log_dir`.
///
/// Repeating the call with the same level and directory is a no-op; any
/// other combination after the first success is rejected.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let log_dir = log_dir.as_ref().to_path_buf();

    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir && state.level == level {
            return Ok(());
        }
        return Err(LoggingError::AlreadyInitialized {
            level: state.level.to_string(),
            dir: state.log_dir.display().to_string(),
        });
    }

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, LoggingError> {
        std::fs::create_dir_all(&log_dir).map_err(|source| LoggingError::Dir {
            dir: log_dir.display().to_string(),
            source,
        })?;

        let logger = Logger::try_with_str(level)?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()?;

        info!(
            "event=logging_init level={level} log_dir={} version={}",
            log_dir.display(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level,
            log_dir: log_dir.clone(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir || state.level != level {
        return Err(LoggingError::AlreadyInitialized {
            level: state.level.to_string(),
            dir: state.log_dir.display().to_string(),
        });
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => Ok("error"),
        "warn" | "warning" => Ok("warn"),
        "info" => Ok("info"),
        "debug" => Ok("debug"),
        "trace" => Ok("trace"),
        _ => Err(LoggingError::Level(level.to_string())),
    }
}
