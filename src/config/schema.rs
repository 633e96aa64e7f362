//! Configuration schema definitions.
//!
//! Every key is optional; the defaults reproduce the fixed link parameters
//! (9600 baud, one-second read timeout, one-second poll).

use super::error::{ConfigError, ConfigResult};
use crate::codec::DEFAULT_MAX_LINE_BYTES;
use crate::port::{PortConfiguration, DEFAULT_BAUD_RATE};
use crate::session::{SessionSettings, DEFAULT_SEND_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Smallest accepted `max_line_bytes`.
const MIN_LINE_BYTES: usize = 64;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link configuration
    pub serial: SerialConfig,
    /// Chat defaults
    pub chat: ChatConfig,
    /// TUI configuration
    pub tui: TuiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the messenger cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::invalid("serial.baud_rate", "must be positive"));
        }
        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::invalid("serial.timeout_ms", "must be positive"));
        }
        if self.serial.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "serial.poll_interval_ms",
                "must be positive",
            ));
        }
        if self.serial.send_queue_capacity == 0 {
            return Err(ConfigError::invalid(
                "serial.send_queue_capacity",
                "must be at least 1",
            ));
        }
        if self.serial.max_line_bytes < MIN_LINE_BYTES {
            return Err(ConfigError::invalid(
                "serial.max_line_bytes",
                format!("must be at least {MIN_LINE_BYTES}"),
            ));
        }
        Ok(())
    }
}

/// Serial link configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate used when opening a port
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    /// Interval between inbound polls in milliseconds
    pub poll_interval_ms: u64,
    /// Longest unterminated inbound line kept before it is discarded
    pub max_line_bytes: usize,
    /// Outbound messages allowed to wait for the writer
    pub send_queue_capacity: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: 1000,
            poll_interval_ms: 1000,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings handed to the session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            port: PortConfiguration {
                baud_rate: self.baud_rate,
                timeout: self.timeout(),
            },
            max_line_bytes: self.max_line_bytes,
            send_queue_capacity: self.send_queue_capacity,
        }
    }
}

/// Chat defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Prefills the username field
    pub username: Option<String>,
}

/// TUI configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Theme name: "classic", "dark", "light"
    pub theme: String,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "classic".to_string(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: "trace" .. "error"
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Multi-line human format
    #[default]
    Pretty,
    /// Single-line format
    Compact,
}
