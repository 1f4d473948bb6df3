//! Unified entity document.
//!
//! One document describes one entity in any zone. The `functions` block is
//! kept loosely typed apart from the parts the generator core reads: the
//! `sources` list with its system (`source`) and model (`model`) entries.

use crate::error::{ModelError, ModelResult};
use crate::schema_guard::UNIFIED_ENTITY_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub entity: EntityDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Functions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit data product; otherwise taken from the folder layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_module: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub attribute: Vec<AttributeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal_number: Option<u32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<String>,
    /// Key / history marker (`BK`, `SK`, `SCD1`, `SCD2`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_type: Option<DataTypeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_type: Option<DataTypeSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_len: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Functions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Value>,
    #[serde(default)]
    pub sources: Vec<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A `source`-typed entry: data pulled from an external system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSource {
    pub data_source: String,
    pub source_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Value>,
    #[serde(default)]
    pub mapping: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub target_name: String,
    pub source_name: String,
}

impl EntityDocument {
    /// Deserialize and check the unified shape.
    pub fn from_value(path: &Path, value: Value) -> ModelResult<Self> {
        let document: EntityDocument = serde_json::from_value(value)
            .map_err(|e| ModelError::invalid_document(path, e.to_string()))?;

        if document.doc_type != UNIFIED_ENTITY_TYPE {
            return Err(ModelError::invalid_document(
                path,
                format!(
                    "expected type '{}', found '{}'",
                    UNIFIED_ENTITY_TYPE, document.doc_type
                ),
            ));
        }
        if document.entity.name.trim().is_empty() {
            return Err(ModelError::invalid_document(path, "entity.name is empty"));
        }

        Ok(document)
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// Attributes ordered by `ordinalNumber`; unnumbered ones keep file order at the end.
    pub fn attributes(&self) -> Vec<&AttributeDefinition> {
        let mut attributes: Vec<_> = self.entity.attribute.iter().collect();
        attributes.sort_by_key(|a| a.ordinal_number.unwrap_or(u32::MAX));
        attributes
    }

    pub fn attributes_of_kind(&self, kind: &str) -> Vec<&AttributeDefinition> {
        self.attributes()
            .into_iter()
            .filter(|a| a.kind.as_deref() == Some(kind))
            .collect()
    }

    pub fn business_key_attributes(&self) -> Vec<&AttributeDefinition> {
        self.attributes_of_kind("BK")
    }

    fn sources_of_type(&self, source_type: &'static str) -> impl Iterator<Item = &Value> {
        self.functions
            .iter()
            .flat_map(|f| f.sources.iter())
            .filter(move |s| s.get("type").and_then(Value::as_str) == Some(source_type))
    }

    /// `source` entries that parse as a system source.
    pub fn system_sources(&self) -> Vec<SystemSource> {
        self.sources_of_type("source")
            .filter_map(|s| s.get("source"))
            .filter_map(|s| serde_json::from_value(s.clone()).ok())
            .collect()
    }

    /// Locators referenced by `model` entries (`model.dm8l` or a flat `dm8l`).
    pub fn model_source_locators(&self) -> Vec<String> {
        self.sources_of_type("model")
            .filter_map(|s| {
                s.get("model")
                    .and_then(|m| m.get("dm8l"))
                    .or_else(|| s.get("dm8l"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "$schema": "../.schema/ModelDataEntity.json",
            "type": "entity",
            "entity": {
                "name": "Product",
                "displayName": "Product",
                "attribute": [
                    { "ordinalNumber": 2, "name": "Name", "targetDataType": { "type": "UnicodeString", "nullable": true, "charLen": 100 } },
                    { "ordinalNumber": 1, "name": "ProductId", "type": "BK", "targetDataType": { "type": "Int32", "nullable": false } },
                    { "name": "Loose" }
                ]
            },
            "functions": {
                "trigger": { "mode": "schedule" },
                "sources": [
                    { "type": "source", "source": { "dataSource": "AdventureWorks", "sourceLocation": "[Production].[Product]" } },
                    { "type": "model", "model": { "dm8l": "/stage/Sales/Product/Product" } },
                    { "type": "model", "dm8l": "/stage/Sales/Product/ProductCategory" }
                ]
            }
        })
    }

    #[test]
    fn attributes_are_ordered_by_ordinal() {
        let doc = EntityDocument::from_value(Path::new("p.json"), sample()).unwrap();
        let names: Vec<_> = doc.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ProductId", "Name", "Loose"]);
        assert_eq!(doc.business_key_attributes().len(), 1);
    }

    #[test]
    fn sources_are_split_by_type() {
        let doc = EntityDocument::from_value(Path::new("p.json"), sample()).unwrap();
        let system = doc.system_sources();
        assert_eq!(system.len(), 1);
        assert_eq!(system[0].data_source, "AdventureWorks");
        assert_eq!(
            doc.model_source_locators(),
            vec![
                "/stage/Sales/Product/Product".to_string(),
                "/stage/Sales/Product/ProductCategory".to_string()
            ]
        );
    }

    #[test]
    fn wrong_type_or_missing_name_is_invalid() {
        let err = EntityDocument::from_value(
            Path::new("x.json"),
            json!({ "type": "table", "entity": { "name": "X" } }),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDocument { .. }));

        let err = EntityDocument::from_value(
            Path::new("x.json"),
            json!({ "type": "entity", "entity": { "name": " " } }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("entity.name"));
    }
}
