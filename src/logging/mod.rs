//! # Logging System
//!
//! Configures the `log` facade for dm8gen. Output goes through `env_logger`;
//! per-feature levels from [`LogConfig`] become module filters on the
//! `dm8gen::<feature>` targets used by the `log_*!` macros.

pub mod config;
pub mod features;

use config::{level_filter, LogConfig};
use features::LogFeature;
use once_cell::sync::OnceCell;
use std::io::Write;

/// Global logging configuration instance
static LOGGING_CONFIG: OnceCell<LogConfig> = OnceCell::new();

pub struct LoggingSystem;

impl LoggingSystem {
    /// Initialize the logging system with default configuration plus env overrides
    pub fn init_default() -> Result<(), LoggingError> {
        Self::init_with_config(LogConfig::from_env())
    }

    /// Initialize the logging system with a custom configuration
    pub fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
        config.validate()?;

        let mut builder = Self::builder(&config);
        LOGGING_CONFIG
            .set(config)
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        builder
            .try_init()
            .map_err(|e| LoggingError::Config(e.to_string()))
    }

    /// Get the active logging configuration, if initialized
    pub fn get_config() -> Option<&'static LogConfig> {
        LOGGING_CONFIG.get()
    }

    fn builder(config: &LogConfig) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();

        if config.console.enabled {
            builder.filter_level(level_filter(&config.general.default_level));
        } else {
            builder.filter_level(log::LevelFilter::Off);
        }

        for feature in LogFeature::ALL {
            if let Some(level) = config.features.get(feature.name()) {
                builder.filter_module(feature.target(), level_filter(level));
            }
        }

        builder.write_style(if config.console.colors {
            env_logger::WriteStyle::Auto
        } else {
            env_logger::WriteStyle::Never
        });

        let include_timestamp = config.console.include_timestamp;
        let include_module = config.console.include_module;
        builder.format(move |buf, record| {
            if include_timestamp {
                write!(buf, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
            }
            write!(buf, "{:<5} ", record.level())?;
            if include_module {
                write!(buf, "[{}] ", record.target())?;
            }
            writeln!(buf, "{}", record.args())
        });

        builder
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
