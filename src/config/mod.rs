//! Resolved runtime configuration.
//!
//! Environment variables win over the settings file, which wins over
//! built-in defaults.

mod helpers;

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::legal::constants::Language;
use crate::settings::Settings;

use helpers::parse_string_env;

/// Database backend configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Language for the app menu and localized vocabulary.
    pub menu_language: Language,
}

fn parse_menu_language(raw: &str) -> Result<Language, ConfigError> {
    Language::from_db_value(raw.trim().to_ascii_lowercase().as_str()).ok_or_else(|| {
        ConfigError::InvalidValue {
            key: "CASEDESK_MENU_LANGUAGE".to_string(),
            message: format!("unsupported language '{}' (expected ar, en, fr, other)", raw),
        }
    })
}

impl AppConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let db_path = parse_string_env("CASEDESK_DB_PATH", settings.database.path.clone())?;
        if db_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "CASEDESK_DB_PATH".to_string(),
                message: "database path must not be empty".to_string(),
            });
        }

        let menu_language_raw =
            parse_string_env("CASEDESK_MENU_LANGUAGE", settings.firm.menu_language.clone())?;

        Ok(Self {
            database: DatabaseConfig {
                path: PathBuf::from(db_path.trim()),
            },
            menu_language: parse_menu_language(&menu_language_raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_settings_defaults() {
        let settings = Settings::default();
        let config = AppConfig::resolve(&settings).expect("default config resolves");
        assert_eq!(config.database.path, PathBuf::from("casedesk.db"));
        assert_eq!(config.menu_language, Language::En);
    }

    #[test]
    fn menu_language_rejects_unknown_values() {
        let err = parse_menu_language("de").expect_err("must reject unsupported language");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "CASEDESK_MENU_LANGUAGE");
        assert!(message.contains("de"), "unexpected message: {message}");
    }

    #[test]
    fn menu_language_is_case_insensitive() {
        assert_eq!(parse_menu_language(" AR ").expect("valid"), Language::Ar);
    }
}
