use crate::document::DataTypeSpec;
use crate::registry::DataSource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A column as reported by a source system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub ordinal_position: u32,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_unique: bool,
    pub default_value: Option<String>,
}

impl ColumnMetadata {
    /// The column's type exactly as the source declares it.
    pub fn source_data_type(&self) -> DataTypeSpec {
        DataTypeSpec {
            type_name: self.data_type.clone(),
            nullable: self.nullable,
            char_len: self.max_length,
            precision: self.precision,
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema_name: String,
    pub table_name: String,
    pub table_type: String,
    pub columns: Vec<ColumnMetadata>,
    pub primary_keys: Vec<String>,
    /// column name -> referenced table
    pub foreign_keys: BTreeMap<String, String>,
    pub unique_constraints: Vec<Vec<String>>,
}

impl TableMetadata {
    /// `[schema].[table]`
    pub fn source_location(&self) -> String {
        format!("[{}].[{}]", self.schema_name, self.table_name)
    }
}

/// What a connector needs to reach a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub data_source_name: String,
    pub data_source_type: String,
    pub connection_string: Option<String>,
    pub extended_properties: Map<String, Value>,
}

impl From<&DataSource> for ConnectionInfo {
    fn from(source: &DataSource) -> Self {
        Self {
            data_source_name: source.name.clone(),
            data_source_type: source.source_type.clone(),
            connection_string: source.connection_string.clone(),
            extended_properties: source.extended_properties.clone(),
        }
    }
}
