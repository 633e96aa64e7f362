//! Errors raised while loading the messenger configuration.
//!
//! Each variant names where the bad value came from (a file path, a config
//! key or an environment variable) so start-up failures point straight at
//! the fix.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` pointed at a file that does not exist
    #[error("config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but the messenger cannot run with it
    #[error("bad value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// A `LORA_MESSENGER_*` override could not be parsed
    #[error("bad value in environment variable {var}: {message}")]
    BadEnv { var: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn bad_env(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadEnv {
            var: var.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        let err = ConfigError::invalid("serial.baud_rate", "must be positive");
        assert_eq!(
            err.to_string(),
            "bad value for serial.baud_rate: must be positive"
        );

        let err = ConfigError::bad_env("LORA_MESSENGER_SERIAL_BAUD_RATE", "Invalid baud rate");
        assert!(err.to_string().contains("LORA_MESSENGER_SERIAL_BAUD_RATE"));
    }
}
