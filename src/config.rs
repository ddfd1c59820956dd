//! Persisted importer configuration.
//!
//! The only stored setting is the Steam installation directory. It lives in a
//! small TOML file:
//!
//! ```toml
//! steam_dir = "C:\\Program Files (x86)\\Steam"
//! ```
//!
//! By default the file is `<config dir>/steam-importer/config.toml`, where
//! `<config dir>` is the platform configuration directory (`%APPDATA%` on
//! Windows, `~/.config` on Linux).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const APP_DIR_NAME: &str = "steam-importer";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
    /// IO error while reading or writing the configuration file.
    #[error("IO error accessing configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The platform has no configuration directory and no path was given.
    #[error("Could not determine a configuration directory; pass --config")]
    NoConfigDir,
}

/// Settings persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Steam installation root. Re-validated on every use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_dir: Option<PathBuf>,
}

/// Where configuration is loaded from and saved to.
pub trait ConfigStore {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ImporterConfig>, ConfigError>;

    fn save(&self, config: &ImporterConfig) -> Result<(), ConfigError>;
}

/// TOML file backed [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `config_path` if given, otherwise the default location.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if no path was given and the
    /// platform configuration directory is unknown.
    pub fn locate(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Ok(Self::new(path)),
            None => Self::default_path().map(Self::new),
        }
    }

    /// `<config dir>/steam-importer/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Option<ImporterConfig>, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no configuration file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn save(&self, config: &ImporterConfig) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| ConfigError::Invalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, content).map_err(io_error)?;

        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}
