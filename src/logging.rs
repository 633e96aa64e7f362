//! `tracing` subscriber setup.
//!
//! The TUI owns the terminal, so in that mode logs always go to a file.
//! Other modes log to stderr unless a file is configured.

use crate::config::{project_dirs, LogFormat, LoggingConfig};
use crate::error::{AppError, AppResult};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// File name used when the TUI runs without a configured log file.
const DEFAULT_LOG_FILE: &str = "lora-messenger.log";

/// Where log output should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, or the configured file.
    Stderr,
    /// A file; the configured one or a default in the platform data dir.
    File,
}

/// Path the TUI logs to when none is configured.
pub fn default_log_path() -> PathBuf {
    project_dirs()
        .map(|d| d.data_local_dir().join(DEFAULT_LOG_FILE))
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
}

/// Build the filter: `RUST_LOG` wins, then an explicit level, then config.
pub fn build_filter(config: &LoggingConfig, level_override: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_override.unwrap_or(&config.level);
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber. Returns the log file path when logging to
/// a file.
pub fn init(
    config: &LoggingConfig,
    target: LogTarget,
    level_override: Option<&str>,
) -> AppResult<Option<PathBuf>> {
    let filter = build_filter(config, level_override);

    let path = match (target, &config.file) {
        (_, Some(path)) => Some(path.clone()),
        (LogTarget::File, None) => Some(default_log_path()),
        (LogTarget::Stderr, None) => None,
    };

    match path {
        Some(path) => {
            let file = open_log_file(&path)?;
            install(filter, config.format, Mutex::new(file), false)?;
            Ok(Some(path))
        }
        None => {
            install(filter, config.format, std::io::stderr, true)?;
            Ok(None)
        }
    }
}

fn open_log_file(path: &Path) -> AppResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn install<W>(filter: EnvFilter, format: LogFormat, writer: W, ansi: bool) -> AppResult<()>
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| AppError::Logging(e.to_string()))
}
