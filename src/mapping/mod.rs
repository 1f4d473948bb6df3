//! Hierarchical type mapping.
//!
//! A source column type is resolved against the data source's own override
//! rules, then its data source type's defaults, and the result is
//! canonicalized through the data type registry.

pub mod engine;

pub use engine::TypeMappingEngine;

use crate::cache::TtlCache;
use crate::config::CacheConfig;
use crate::document::DataTypeSpec;
use crate::error::{ModelError, ModelResult};
use std::num::NonZeroUsize;

/// Cache of resolved canonical types keyed by `(data source, source type)`.
pub type MappingCache = TtlCache<(String, String), String>;

impl MappingCache {
    pub fn from_config(config: &CacheConfig) -> ModelResult<Self> {
        let capacity = NonZeroUsize::new(config.max_size)
            .ok_or_else(|| ModelError::configuration("cache.max_size must be greater than 0"))?;
        Ok(Self::new(capacity, config.ttl()))
    }

    /// Drop every cached resolution for one data source.
    pub fn invalidate_source(&self, data_source: &str) -> usize {
        self.invalidate_where(|(source, _)| source == data_source)
    }
}

/// Result of mapping one source column.
///
/// `attribute_type` (business key, history tracking) is never inferred and
/// stays `None` until a user sets it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTypeMapping {
    pub attribute_type: Option<String>,
    pub source_data_type: DataTypeSpec,
    pub target_data_type: DataTypeSpec,
}
