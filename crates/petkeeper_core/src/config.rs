//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Resolve the database location and search debounce window.
//! - Apply environment overrides on top of built-in defaults.
//!
//! # Invariants
//! - Blank environment values are ignored, never treated as paths.
//! - Unparseable debounce values fall back to the default.

use crate::search::debounce::DEFAULT_DEBOUNCE;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "PETKEEPER_DB_PATH";
pub const SEARCH_DEBOUNCE_ENV: &str = "PETKEEPER_SEARCH_DEBOUNCE_MS";
const DEFAULT_DB_FILE_NAME: &str = "petkeeper.sqlite3";

/// Core configuration as loaded by the composition root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file path.
    pub db_path: PathBuf,
    /// Quiet period before a search box change triggers a query.
    pub search_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `PETKEEPER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = non_blank(lookup(DB_PATH_ENV)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(ms) = non_blank(lookup(SEARCH_DEBOUNCE_ENV)).and_then(|raw| raw.parse().ok()) {
            config.search_debounce_ms = ms;
        }
        config
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, SEARCH_DEBOUNCE_ENV};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn defaults_use_temp_dir_and_300ms() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(config.db_path.ends_with("petkeeper.sqlite3"));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn lookup_overrides_apply_and_blank_values_are_ignored() {
        let config = AppConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some(" /data/pets.sqlite3 ".to_string()),
            SEARCH_DEBOUNCE_ENV => Some("50".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/data/pets.sqlite3"));
        assert_eq!(config.search_debounce_ms, 50);

        let blank = AppConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("   ".to_string()),
            SEARCH_DEBOUNCE_ENV => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(blank, AppConfig::from_lookup(|_| None));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: AppConfig = serde_json::from_str(r#"{"search_debounce_ms": 10}"#).unwrap();
        assert_eq!(config.search_debounce_ms, 10);
        assert!(config.db_path.ends_with("petkeeper.sqlite3"));
    }
}
