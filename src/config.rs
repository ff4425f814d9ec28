//! Application settings.
//!
//! Settings are read from a TOML file and control where the extension table
//! is stored and which category name is used for unmapped extensions when the
//! table has no `others` row.
//!
//! # Configuration File Format
//!
//! ```toml
//! mapping_file = "/home/user/.config/foldertidy/data.csv"
//! fallback_category = "Outros"
//! ```
//!
//! Both keys are optional.

use crate::file_category::DEFAULT_FALLBACK_CATEGORY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory settings file.
pub const LOCAL_CONFIG_FILE: &str = ".foldertidy.toml";

/// Name of the mapping file inside the settings directory.
pub const MAPPING_FILE_NAME: &str = "data.csv";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Settings deserialized from the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the CSV mapping file. Defaults to [`default_mapping_file`].
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,

    /// Category used for unmapped extensions when there is no `others` row.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
}

fn default_fallback_category() -> String {
    DEFAULT_FALLBACK_CATEGORY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mapping_file: None,
            fallback_category: default_fallback_category(),
        }
    }
}

impl AppConfig {
    /// Load settings, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.foldertidy.toml` in the current directory
    /// 3. Look for `~/.config/foldertidy/config.toml` in home directory
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a file is explicitly provided but cannot be read,
    /// or if any file that is found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(dir) = config_dir() {
            let home_config = dir.join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if config.fallback_category.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "fallback_category must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Resolved mapping file location.
    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_file
            .clone()
            .unwrap_or_else(default_mapping_file)
    }
}

/// `~/.config/foldertidy`, if `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join(env!("CARGO_PKG_NAME"))
    })
}

/// Default mapping file: inside [`config_dir`], else `data.csv` in the
/// current directory.
pub fn default_mapping_file() -> PathBuf {
    config_dir()
        .map(|dir| dir.join(MAPPING_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(MAPPING_FILE_NAME))
}
