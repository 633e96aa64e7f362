//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "LORA_MESSENGER";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file name looked up in the working directory
const LOCAL_CONFIG_FILE_NAME: &str = "lora-messenger.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "LORA_MESSENGER_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `LORA_MESSENGER_CONFIG` environment variable
    /// 2. `./lora-messenger.toml`
    /// 3. `<platform config dir>/lora-messenger/config.toml`
    /// 4. Built-in defaults
    ///
    /// Environment variables override file values; the result is validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();
        let config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };
        Self::finish(config_path, config)
    }

    /// Load configuration from a specific file path, which must exist.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let config = load_from_file(&path)?;
        Self::finish(Some(path), config)
    }

    /// Create a loader with default configuration (no file, no env).
    pub fn with_defaults() -> Self {
        Self {
            config_path: None,
            config: Config::default(),
        }
    }

    fn finish(config_path: Option<PathBuf>, mut config: Config) -> ConfigResult<Self> {
        apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|p| p.exists())
}

/// Platform directories for this application.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lora-messenger")
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `LORA_MESSENGER_<SECTION>_<KEY>` environment overrides.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from any key lookup (the process environment in
/// production).
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| format!("{ENV_PREFIX}_{suffix}");

    if let Some(v) = parse_var(&lookup, &var("SERIAL_BAUD_RATE"), "Invalid baud rate")? {
        config.serial.baud_rate = v;
    }
    if let Some(v) = parse_var(&lookup, &var("SERIAL_TIMEOUT_MS"), "Invalid timeout")? {
        config.serial.timeout_ms = v;
    }
    if let Some(v) = parse_var(
        &lookup,
        &var("SERIAL_POLL_INTERVAL_MS"),
        "Invalid poll interval",
    )? {
        config.serial.poll_interval_ms = v;
    }
    if let Some(v) = lookup(&var("CHAT_USERNAME")) {
        config.chat.username = Some(v);
    }
    if let Some(v) = lookup(&var("TUI_THEME")) {
        config.tui.theme = v;
    }
    if let Some(v) = lookup(&var("LOGGING_LEVEL")) {
        config.logging.level = v;
    }
    if let Some(v) = lookup(&var("LOGGING_FILE")) {
        config.logging.file = Some(PathBuf::from(v));
    }

    Ok(())
}

fn parse_var<T, F>(lookup: &F, key: &str, message: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::bad_env(key, message)),
        None => Ok(None),
    }
}
