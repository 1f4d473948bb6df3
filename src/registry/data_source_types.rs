use super::{load_records, matching_rules, TypeMappingRule};
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperty {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A kind of source system with default type mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub data_type_mapping: Vec<TypeMappingRule>,
    #[serde(default)]
    pub connection_properties: Vec<ConnectionProperty>,
}

impl DataSourceType {
    /// Default rules for `source_type`, in declaration order.
    pub fn default_mappings(&self, source_type: &str) -> Vec<&TypeMappingRule> {
        matching_rules(&self.data_type_mapping, source_type)
    }

    pub fn required_properties(&self) -> Vec<&str> {
        self.connection_properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn optional_properties(&self) -> Vec<&str> {
        self.connection_properties
            .iter()
            .filter(|p| !p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Names of required properties absent (or null) in `config`.
    pub fn missing_connection_properties(&self, config: &Map<String, Value>) -> Vec<String> {
        self.required_properties()
            .into_iter()
            .filter(|name| config.get(*name).map_or(true, Value::is_null))
            .map(str::to_string)
            .collect()
    }

    pub fn validate_connection_config(&self, config: &Map<String, Value>) -> Result<(), Vec<String>> {
        let missing = self.missing_connection_properties(config);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataSourceTypeRegistry {
    types: Vec<DataSourceType>,
}

impl DataSourceTypeRegistry {
    pub fn new(types: Vec<DataSourceType>) -> Self {
        Self { types }
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        let types = load_records(path)?;
        Ok(Self::new(types))
    }

    pub fn get(&self, name: &str) -> Option<&DataSourceType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sql() -> DataSourceType {
        serde_json::from_value(json!({
            "name": "SqlDataSource",
            "displayName": "SQL Server",
            "dataTypeMapping": [
                { "sourceType": "varchar", "targetType": "text" },
                { "sourceType": "int", "targetType": "int" }
            ],
            "connectionProperties": [
                { "name": "server", "required": true },
                { "name": "database", "required": true },
                { "name": "port" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn properties_split_by_required_flag() {
        let t = sql();
        assert_eq!(t.required_properties(), vec!["server", "database"]);
        assert_eq!(t.optional_properties(), vec!["port"]);
    }

    #[test]
    fn validates_connection_config() {
        let t = sql();
        let mut config = Map::new();
        config.insert("server".into(), json!("localhost"));
        config.insert("database".into(), Value::Null);
        assert_eq!(t.validate_connection_config(&config), Err(vec!["database".to_string()]));

        config.insert("database".into(), json!("AdventureWorks"));
        assert!(t.validate_connection_config(&config).is_ok());
    }

    #[test]
    fn default_mappings_match_exactly() {
        let t = sql();
        assert_eq!(t.default_mappings("varchar")[0].target_type, "text");
        assert!(t.default_mappings("VARCHAR").is_empty());
    }
}
