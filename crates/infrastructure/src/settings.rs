//! Client configuration.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. An optional TOML/JSON/YAML file
//! 3. `PETMANAGER_*` environment variables (`PETMANAGER_API_URL`, ...)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://pet-manager-api.geia.vip";
/// Prefix of the environment variables read by [`AppConfig::load`].
pub const ENV_PREFIX: &str = "PETMANAGER";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),

    /// No data directory could be determined for the session file.
    #[error("no data directory available; set PETMANAGER_DATA_DIR")]
    NoDataDir,

    /// `request_timeout_secs` is zero, which would fail every request.
    #[error("request_timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Settings for the Pet Manager client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// API base URL; request paths are appended to it.
    pub api_url: String,
    /// Route announced when the session ends.
    pub login_path: String,
    /// Route authenticated users land on.
    pub landing_path: String,
    /// Directory holding the session file. Defaults to the platform data
    /// directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration from the optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is unreadable or a value is malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(file, None)
    }

    /// Loads configuration, reading variables from `env` instead of the
    /// process environment when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is unreadable, a value is malformed or
    /// the request timeout is zero.
    pub fn from_sources(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("login_path", "/auth/login")?
            .set_default("landing_path", "/pets")?
            .set_default("request_timeout_secs", 30)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the session file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDataDir` if none is configured and the
    /// platform has no data directory.
    pub fn session_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("petmanager"))
                .ok_or(ConfigError::NoDataDir),
        }
    }
}
