//! File-backed settings (`casedesk.toml`).
//!
//! Settings provide the defaults; environment variables override them during
//! [`crate::config::AppConfig::resolve`]. A missing settings file is fine,
//! everything has a default.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_SETTINGS_PATH: &str = "casedesk.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub firm: FirmSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path of the local database file.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirmSettings {
    /// Language used for the app menu and vocabulary (ar, en, fr, other).
    pub menu_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            firm: FirmSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "casedesk.db".to_string(),
        }
    }
}

impl Default for FirmSettings {
    fn default() -> Self {
        Self {
            menu_language: "en".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but fails to parse is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::SettingsRead {
                    path: path.display().to_string(),
                    source: err,
                });
            }
        };

        toml::from_str(&raw).map_err(|source| ConfigError::SettingsParse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_falls_back_to_defaults() {
        let settings =
            Settings::load(Path::new("definitely-not-here/casedesk.toml")).expect("defaults");
        assert_eq!(settings.database.path, "casedesk.db");
        assert_eq!(settings.firm.menu_language, "en");
    }

    #[test]
    fn settings_parse_partial_toml() {
        let settings: Settings =
            toml::from_str("[firm]\nmenu_language = \"ar\"\n").expect("partial toml");
        assert_eq!(settings.firm.menu_language, "ar");
        assert_eq!(settings.database.path, "casedesk.db");
    }
}
