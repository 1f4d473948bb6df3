use super::load_records;
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canonical logical data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub has_char_len: bool,
    #[serde(default)]
    pub has_precision: bool,
    #[serde(default)]
    pub has_scale: bool,
    /// Physical storage alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parquet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DataTypeRegistry {
    types: Vec<DataType>,
}

impl DataTypeRegistry {
    pub fn new(types: Vec<DataType>) -> Self {
        Self { types }
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        Ok(Self::new(load_records(path)?))
    }

    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Registry entry for a type token: by canonical name first, then by
    /// its `parquetType` alias (first declared wins).
    pub fn canonical(&self, token: &str) -> Option<&DataType> {
        self.get(token).or_else(|| {
            self.types
                .iter()
                .find(|t| t.parquet_type.as_deref() == Some(token))
        })
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
