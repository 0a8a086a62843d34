//! Editor configuration
//!
//! Settings that shape how array editors behave. Stored as JSON or TOML,
//! by default under the platform configuration directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsResult};

/// How a commit decides whether the property was modified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModifiedDetection {
    /// Compare committed values against the stored ones
    #[default]
    CompareValues,
    /// Any cell edit or structural operation counts, even if reverted
    AnyEdit,
}

impl std::fmt::Display for ModifiedDetection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompareValues => write!(f, "compare_values"),
            Self::AnyEdit => write!(f, "any_edit"),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Settings for array property editors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Default tracing level when RUST_LOG is unset
    pub log_level: String,
    /// Select a row right after inserting it
    pub select_inserted_row: bool,
    /// Warn about columns that have no cell editor
    pub warn_unmapped_columns: bool,
    /// Modified-flag policy for commits
    pub modified_detection: ModifiedDetection,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            select_inserted_row: true,
            warn_unmapped_columns: true,
            modified_detection: ModifiedDetection::CompareValues,
        }
    }
}

impl EditorSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the settings file
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("diaprops").join("editor.toml"))
            .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(unsupported(path).into());
        };

        settings.validate()?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        let Ok(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(unsupported(path).into());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidSetting {
                key: "log_level".to_string(),
                reason: format!("unknown level '{}'", self.log_level),
            });
        }
        Ok(())
    }
}

fn unsupported(path: &Path) -> ConfigError {
    ConfigError::UnsupportedFormat(
        path.extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = EditorSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.select_inserted_row);
        assert_eq!(settings.modified_detection, ModifiedDetection::CompareValues);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let settings = EditorSettings {
            log_level: "loud".to_string(),
            ..EditorSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        let settings = EditorSettings {
            log_level: "debug".to_string(),
            modified_detection: ModifiedDetection::AnyEdit,
            ..EditorSettings::default()
        };
        settings.save_to_file(&path).unwrap();
        assert_eq!(EditorSettings::load_from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{ "select_inserted_row": false }"#).unwrap();
        let settings = EditorSettings::load_from_file(&path).unwrap();
        assert!(!settings.select_inserted_row);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.yaml");
        assert!(EditorSettings::default().save_to_file(&path).is_err());
    }
}
