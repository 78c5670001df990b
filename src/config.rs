//! Application settings
//!
//! Read once at startup from a JSON file in the user's config directory:
//! - Linux: ~/.config/profile-editor/settings.json
//! - macOS: ~/Library/Application Support/profile-editor/settings.json
//! - Windows: %APPDATA%\profile-editor\settings.json
//!
//! Every field is optional in the file; missing ones take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Longest side of the displayed photo; `null` keeps full resolution
    pub max_dimension: Option<u32>,
    /// Files above this size are refused before reading
    pub max_file_bytes: u64,
    /// Worker threads for fetching and decoding
    pub worker_threads: usize,
    /// Log filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_dimension: Some(1024),
            max_file_bytes: 50 * 1024 * 1024,
            worker_threads: 2,
            log_filter: "profile_editor=info".to_string(),
        }
    }
}

impl Settings {
    /// Where the settings file lives, if a config directory exists
    pub fn path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("profile-editor");
        path.push("settings.json");
        Some(path)
    }

    /// Load from the default location, falling back to defaults when
    /// there is no file
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.worker_threads = settings.worker_threads.max(1);
        Ok(settings)
    }
}
