//! Generator configuration (`dm8gen.toml`).
//!
//! Every section is optional; a missing file yields the defaults.

use crate::constants::{DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL_SECS};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub cache: CacheConfig,
    pub index: IndexConfig,
}

/// Settings for the type-mapping cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_size: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Fail the index build when any model file fails to parse
    pub strict: bool,
}

impl GeneratorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            ModelError::configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.cache.enabled && self.cache.max_size == 0 {
            return Err(ModelError::configuration(
                "cache.max_size must be greater than 0",
            ));
        }
        Ok(())
    }
}
