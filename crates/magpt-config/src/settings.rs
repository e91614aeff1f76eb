//! Process-level client settings (storage location, origin, logging)

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{error::Result, storage::default_storage_dir};

/// Origin used when the preferences leave the API URL empty
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Settings that control the client process rather than the chat itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    /// Directory holding persisted preferences
    pub storage_dir: PathBuf,
    /// Origin requests go to when no API URL is set
    pub origin: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            origin: DEFAULT_ORIGIN.to_string(),
            log_level: "warn".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// Loads [`ClientSettings`] from an optional TOML file and the environment
pub struct SettingsLoader {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl SettingsLoader {
    /// Loader for the default config file and `MAGPT_*` variables
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "MAGPT".to_string(),
        }
    }

    /// Loader for a custom config file
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: "MAGPT".to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Path of the config file this loader reads
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("magpt")
            .join("magpt.toml")
    }

    /// Merge defaults, the config file (if present) and the environment
    pub fn load(&self) -> Result<ClientSettings> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(Environment::with_prefix(&self.env_prefix));

        let config = builder.build()?;
        let settings: ClientSettings = config.try_deserialize()?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}
