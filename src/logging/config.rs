//! Configuration management for the logging system
//!
//! Logging configuration is loaded from a TOML file and can be overridden
//! through `DM8GEN_LOG_*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::features::LogFeature;

const VALID_LEVELS: [&str; 6] = ["OFF", "TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Main logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub general: GeneralConfig,
    pub console: ConsoleConfig,
    /// Feature-specific log levels, keyed by feature name (`index`, `type_mapping`, ...)
    pub features: HashMap<String, String>,
}

/// General logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default log level for all modules
    pub default_level: String,
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colors: bool,
    pub include_timestamp: bool,
    pub include_module: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_level: "INFO".to_string(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colors: true,
            include_timestamp: true,
            include_module: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let mut config: LogConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("DM8GEN_LOG_LEVEL") {
            self.general.default_level = level.to_uppercase();
        }
        if let Ok(enabled) = std::env::var("DM8GEN_LOG_CONSOLE") {
            self.console.enabled = enabled.parse().unwrap_or(true);
        }
        if let Ok(colors) = std::env::var("DM8GEN_LOG_COLORS") {
            self.console.colors = colors.parse().unwrap_or(true);
        }

        for (key, value) in std::env::vars() {
            if let Some(feature) = key.strip_prefix("DM8GEN_LOG_FEATURE_") {
                self.features
                    .insert(feature.to_lowercase(), value.to_uppercase());
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.general.default_level.as_str()) {
            return Err(ConfigError::InvalidLevel(
                self.general.default_level.clone(),
            ));
        }

        for (feature, level) in &self.features {
            if LogFeature::from_name(feature).is_none() {
                return Err(ConfigError::UnknownFeature(feature.clone()));
            }
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidFeatureLevel(
                    feature.clone(),
                    level.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Parse a level name into a filter; unknown names fall back to `Info`.
pub fn level_filter(level: &str) -> log::LevelFilter {
    match level.to_uppercase().as_str() {
        "OFF" => log::LevelFilter::Off,
        "TRACE" => log::LevelFilter::Trace,
        "DEBUG" => log::LevelFilter::Debug,
        "WARN" => log::LevelFilter::Warn,
        "ERROR" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Invalid log level for feature '{0}': {1}")]
    InvalidFeatureLevel(String, String),
    #[error("Unknown logging feature: {0}")]
    UnknownFeature(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        assert!(LogConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_level_and_feature() {
        let mut config = LogConfig::default();
        config.general.default_level = "LOUD".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLevel(_))));

        let mut config = LogConfig::default();
        config
            .features
            .insert("network".to_string(), "INFO".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownFeature(_))
        ));
    }

    #[test]
    fn toml_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logging").join("log.toml");

        let mut config = LogConfig::default();
        config
            .features
            .insert("type_mapping".to_string(), "DEBUG".to_string());
        config.save_to_file(&path).unwrap();

        let loaded: LogConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.features.get("type_mapping").unwrap(), "DEBUG");
        assert_eq!(loaded.general.default_level, "INFO");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: LogConfig = toml::from_str("[general]\ndefault_level = \"WARN\"\n").unwrap();
        assert_eq!(config.general.default_level, "WARN");
        assert!(config.console.enabled);
        assert_eq!(level_filter(&config.general.default_level), log::LevelFilter::Warn);
    }
}
