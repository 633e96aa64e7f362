//! Configuration for the messenger.
//!
//! TOML-based configuration with environment variable overrides. No file is
//! required; the built-in defaults are the fixed link parameters.
//!
//! # Configuration Resolution
//!
//! 1. `--config PATH` on the command line
//! 2. `LORA_MESSENGER_CONFIG` environment variable
//! 3. `./lora-messenger.toml`
//! 4. `<platform config dir>/lora-messenger/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Overrides
//!
//! Pattern: `LORA_MESSENGER_<SECTION>_<KEY>`, for example
//! `LORA_MESSENGER_SERIAL_BAUD_RATE=9600` or
//! `LORA_MESSENGER_CHAT_USERNAME=alice`.
//!
//! ```rust,no_run
//! use lora_messenger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! println!("Polling every {:?}", config.serial.poll_interval());
//! # Ok::<(), lora_messenger::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_overrides, get_default_config_path, project_dirs, resolve_config_path, ConfigLoader,
};
pub use schema::{ChatConfig, Config, LogFormat, LoggingConfig, SerialConfig, TuiConfig};
