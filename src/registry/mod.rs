//! Type registries: data source types, data sources and canonical data types.
//!
//! The three documents live in the solution's base folder and are read once
//! per session. Each holds a list of named records, either as a bare JSON
//! array or wrapped in an object (`{"type": ..., "items": [...]}`).

pub mod data_source_types;
pub mod data_sources;
pub mod data_types;

pub use data_source_types::{ConnectionProperty, DataSourceType, DataSourceTypeRegistry};
pub use data_sources::{DataSource, DataSourceRegistry};
pub use data_types::{DataType, DataTypeRegistry};

use crate::document::read_json_file;
use crate::error::{ModelError, ModelResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One `sourceType -> targetType` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMappingRule {
    pub source_type: String,
    pub target_type: String,
}

impl TypeMappingRule {
    pub fn new(source_type: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            target_type: target_type.into(),
        }
    }
}

/// Rules in `rules` whose source type equals `token`, in declaration order.
pub(crate) fn matching_rules<'a>(rules: &'a [TypeMappingRule], token: &str) -> Vec<&'a TypeMappingRule> {
    rules.iter().filter(|r| r.source_type == token).collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryDocument<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "dataSourceTypes",
            alias = "sourceTypes",
            alias = "dataSources",
            alias = "dataTypes"
        )]
        items: Vec<T>,
    },
}

/// Read the records of a registry document.
pub(crate) fn load_records<T: DeserializeOwned>(path: &Path) -> ModelResult<Vec<T>> {
    let value = read_json_file(path)?;
    let document: RegistryDocument<T> = serde_json::from_value(value).map_err(|_| {
        ModelError::invalid_document(
            path,
            "expected a list of records or an object with an 'items' list",
        )
    })?;
    Ok(match document {
        RegistryDocument::Bare(items) | RegistryDocument::Wrapped { items } => items,
    })
}
