use super::{load_records, matching_rules, TypeMappingRule};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// A configured source system, an instance of a [`DataSourceType`](super::DataSourceType).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(
        rename = "ExtendedProperties",
        alias = "extendedProperties",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub extended_properties: Map<String, Value>,
    /// Overrides checked before the data source type defaults
    #[serde(default)]
    pub data_type_mapping: Vec<TypeMappingRule>,
}

impl DataSource {
    pub fn override_mappings(&self, source_type: &str) -> Vec<&TypeMappingRule> {
        matching_rules(&self.data_type_mapping, source_type)
    }

    /// Connection settings: extended properties plus `connectionString` when set.
    pub fn connection_properties(&self) -> Map<String, Value> {
        let mut properties = self.extended_properties.clone();
        if let Some(connection_string) = &self.connection_string {
            properties.insert(
                "connectionString".to_string(),
                Value::String(connection_string.clone()),
            );
        }
        properties
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataSourceRegistry {
    sources: Vec<DataSource>,
}

impl DataSourceRegistry {
    pub fn new(sources: Vec<DataSource>) -> Self {
        Self { sources }
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        Ok(Self::new(load_records(path)?))
    }

    pub fn get(&self, name: &str) -> ModelResult<&DataSource> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ModelError::DataSourceNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
