//! # Engine Configuration
//!
//! Database location and tariff codes for the resolution engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ACCESSORIAL_DB_PATH=/var/lib/accessorial/accessorial.db            │
//! │     ACCESSORIAL_CRATING_CODES=105B,105E                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, or accessorial.toml in the platform config dir      │
//! │     ~/.config/accessorial/accessorial.toml (Linux)                     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./accessorial.db, codes 105B/105E, 35A, 226A, 125*                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/accessorial/accessorial.db"
//! max_connections = 5
//!
//! [tariff]
//! crating_codes = ["105B", "105E"]
//! capped_cost_code = "35A"
//! actual_cost_code = "226A"
//! dated_location_prefix = "125"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pool::DbConfig;
use accessorial_core::TariffCodes;

/// Configuration file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "accessorial.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("accessorial.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub tariff: TariffCodes,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform default)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading engine config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks values the rest of the engine relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        let tariff = &self.tariff;
        if tariff.capped_cost_code.is_empty() || tariff.actual_cost_code.is_empty() {
            return Err(ConfigError::Invalid(
                "tariff cost codes must not be empty".into(),
            ));
        }

        if tariff.capped_cost_code == tariff.actual_cost_code {
            return Err(ConfigError::Invalid(format!(
                "capped and actual cost codes must differ, both are '{}'",
                tariff.capped_cost_code
            )));
        }

        if tariff.dated_location_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "tariff.dated_location_prefix must not be empty".into(),
            ));
        }

        if tariff.crating_codes.iter().any(|code| code.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "tariff.crating_codes must not contain empty codes".into(),
            ));
        }

        // Every specialized code belongs to exactly one family table.
        let listed = tariff
            .crating_codes
            .iter()
            .map(|code| ("crating_codes", code))
            .chain([
                ("capped_cost_code", &tariff.capped_cost_code),
                ("actual_cost_code", &tariff.actual_cost_code),
            ]);
        for (field, code) in listed {
            if code.starts_with(&tariff.dated_location_prefix) {
                return Err(ConfigError::Invalid(format!(
                    "tariff.{field} '{code}' overlaps dated_location_prefix '{}'",
                    tariff.dated_location_prefix
                )));
            }
            if field != "crating_codes" && tariff.is_crating(code) {
                return Err(ConfigError::Invalid(format!(
                    "tariff.{field} '{code}' is also listed in crating_codes"
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ACCESSORIAL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("ACCESSORIAL_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring non-numeric ACCESSORIAL_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(code) = lookup("ACCESSORIAL_CAPPED_COST_CODE") {
            self.tariff.capped_cost_code = code;
        }

        if let Some(code) = lookup("ACCESSORIAL_ACTUAL_COST_CODE") {
            self.tariff.actual_cost_code = code;
        }

        if let Some(prefix) = lookup("ACCESSORIAL_DATED_LOCATION_PREFIX") {
            self.tariff.dated_location_prefix = prefix;
        }

        if let Some(codes) = lookup("ACCESSORIAL_CRATING_CODES") {
            self.tariff.crating_codes = codes
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(String::from)
                .collect();
            debug!(codes = ?self.tariff.crating_codes, "Overriding crating codes from environment");
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "accessorial", "accessorial")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let db = &self.database;
        let config = if db.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&db.path)
                .max_connections(db.max_connections)
                .min_connections(db.min_connections)
        };
        config.connect_timeout(Duration::from_secs(db.connect_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.database.path, PathBuf::from("accessorial.db"));
        assert_eq!(config.tariff, TariffCodes::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [tariff]
            capped_cost_code = "36A"
            "#,
        )
        .unwrap();
        assert_eq!(config.tariff.capped_cost_code, "36A");
        assert_eq!(config.tariff.actual_cost_code, "226A");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_bad_toml() {
        let err = EngineConfig::from_toml("[database\npath = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ACCESSORIAL_DB_PATH", ":memory:"),
            ("ACCESSORIAL_DB_MAX_CONNECTIONS", "lots"),
            ("ACCESSORIAL_DATED_LOCATION_PREFIX", "130"),
            ("ACCESSORIAL_CRATING_CODES", "105B, 105E ,,105J"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.tariff.dated_location_prefix, "130");
        assert_eq!(config.tariff.crating_codes, vec!["105B", "105E", "105J"]);
        assert!(config.db_config().is_in_memory());
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.tariff.actual_cost_code = "35A".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.database.min_connections = 9;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.tariff.dated_location_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_overlapping_codes() {
        let mut config = EngineConfig::default();
        config.tariff.capped_cost_code = "125A".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tariff.capped_cost_code '125A' overlaps dated_location_prefix '125'"
        );

        let mut config = EngineConfig::default();
        config.tariff.dated_location_prefix = "105".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.tariff.actual_cost_code = "105E".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("also listed in crating_codes"));

        let mut config = EngineConfig::default();
        config.tariff.crating_codes.push("105J".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("accessorial-missing-config.toml");
        let config = EngineConfig::load(Some(path)).unwrap();
        assert_eq!(config.tariff.crating_codes.len(), 2);
    }
}
