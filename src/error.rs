//! Top-level error type for the binary.
//!
//! Everything below the front-ends recovers locally; only start-up problems
//! (bad configuration, a terminal that cannot be set up, a log file that
//! cannot be opened) reach `main`.

use crate::config::ConfigError;
use crate::port::PortError;
use crate::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Port(#[from] PortError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("failed to serialize output: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenient Result type for application entry points.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_context() {
        let err: AppError = PortError::not_found("COM7").into();
        assert_eq!(
            err.to_string(),
            "serial port error: Serial port not found: COM7"
        );

        let err: AppError = ConfigError::invalid("serial.baud_rate", "must be positive").into();
        assert!(err.to_string().starts_with("configuration error"));

        let err: AppError = SessionError::NotConnected.into();
        assert_eq!(err.to_string(), "session error: no serial port is connected");
    }
}
