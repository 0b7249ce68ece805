//! Settings persistence.
//!
//! Tunable inference thresholds and interaction defaults, stored as JSON in
//! the platform config directory. Every field has a default so partial files
//! stay valid across versions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::infer::InferenceThresholds;

/// Errors from reading or writing a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Interaction defaults for brushes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Rows moved per arrow-key press
    pub keyboard_step: usize,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self { keyboard_step: 1 }
    }
}

/// Settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub inference: InferenceThresholds,
    #[serde(default)]
    pub brush: BrushSettings,
}

fn default_version() -> u32 {
    1
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            version: 1,
            inference: InferenceThresholds::default(),
            brush: BrushSettings::default(),
        }
    }
}

impl ChartSettings {
    /// Get the config directory path for autochart
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("autochart"))
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::get_settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
