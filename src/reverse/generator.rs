//! Staging entity generation from source system metadata.

use super::connector::{parse_table_name, ConnectorRegistry, SourceConnector};
use super::metadata::{ConnectionInfo, TableMetadata};
use crate::constants::ENTITY_SCHEMA_REF;
use crate::document::{
    write_json_atomic, AttributeDefinition, ColumnMapping, EntityDefinition, EntityDocument,
    Functions, SystemSource,
};
use crate::error::{ModelError, ModelResult};
use crate::mapping::TypeMappingEngine;
use crate::schema_guard::UNIFIED_ENTITY_TYPE;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Tables to turn into staging entities.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub data_source: String,
    pub data_product: String,
    pub data_module: String,
    /// Table names, optionally schema qualified
    pub tables: Vec<String>,
    /// Entity name per table; defaults to the unqualified table name
    pub entity_names: Option<Vec<String>>,
}

pub struct ReverseGenerator<'a> {
    engine: &'a TypeMappingEngine,
    connectors: &'a ConnectorRegistry,
    stage_root: PathBuf,
}

impl<'a> ReverseGenerator<'a> {
    pub fn new(
        engine: &'a TypeMappingEngine,
        connectors: &'a ConnectorRegistry,
        stage_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            connectors,
            stage_root: stage_root.into(),
        }
    }

    /// Generate one entity document per table; returns the written paths.
    ///
    /// Fails before writing anything if the data source is misconfigured or
    /// a requested table does not exist.
    pub fn generate(&self, request: &GenerationRequest) -> ModelResult<Vec<PathBuf>> {
        let entity_names = self.entity_names(request)?;
        crate::log_reverse_info!(
            "Starting reverse generation for {} table(s) from '{}'",
            request.tables.len(),
            request.data_source
        );

        let info = self.connection_info(&request.data_source)?;
        let mut connector = self.connectors.create(info)?;
        connector.connect()?;

        let result = self.generate_with(connector.as_mut(), request, &entity_names);
        if let Err(e) = connector.disconnect() {
            crate::log_reverse_warn!("Failed to disconnect from '{}': {}", request.data_source, e);
        }

        let written = result?;
        crate::log_reverse_info!("Generated {} staging entities", written.len());
        Ok(written)
    }

    fn entity_names(&self, request: &GenerationRequest) -> ModelResult<Vec<String>> {
        match &request.entity_names {
            Some(names) if names.len() != request.tables.len() => Err(ModelError::configuration(format!(
                "{} entity name(s) given for {} table(s)",
                names.len(),
                request.tables.len()
            ))),
            Some(names) => Ok(names.clone()),
            None => Ok(request
                .tables
                .iter()
                .map(|t| parse_table_name(t).1)
                .collect()),
        }
    }

    /// Connection settings, checked against the data source type's required properties.
    fn connection_info(&self, data_source: &str) -> ModelResult<ConnectionInfo> {
        let source = self.engine.data_sources().get(data_source)?;
        let source_type = self
            .engine
            .data_source_types()
            .get(&source.source_type)
            .ok_or_else(|| ModelError::DataSourceTypeNotFound(source.source_type.clone()))?;

        source_type
            .validate_connection_config(&source.connection_properties())
            .map_err(|missing| {
                ModelError::connector(format!(
                    "Data source '{}' is missing required connection properties: {}",
                    data_source,
                    missing.join(", ")
                ))
            })?;

        Ok(ConnectionInfo::from(source))
    }

    fn generate_with(
        &self,
        connector: &mut dyn SourceConnector,
        request: &GenerationRequest,
        entity_names: &[String],
    ) -> ModelResult<Vec<PathBuf>> {
        if !connector.test_connection()? {
            return Err(ModelError::connector(format!(
                "Failed to connect to data source '{}'",
                request.data_source
            )));
        }

        let available: Vec<String> = connector
            .discover_tables(None)?
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect();
        let missing: Vec<&str> = request
            .tables
            .iter()
            .filter(|t| {
                let wanted = t.to_lowercase();
                !available.iter().any(|a| *a == wanted || parse_table_name(a).1 == wanted)
            })
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::connector(format!(
                "Table(s) not found in data source '{}': {}",
                request.data_source,
                missing.join(", ")
            )));
        }

        let mut written = Vec::with_capacity(request.tables.len());
        for (table, entity_name) in request.tables.iter().zip(entity_names) {
            crate::log_reverse_info!("Extracting metadata for table '{}'", table);
            let metadata = connector.table_metadata(table)?;
            if metadata.columns.is_empty() {
                crate::log_reverse_warn!("No columns found for table '{}', skipping", table);
                continue;
            }

            let document = self.build_entity(entity_name, &metadata, &request.data_source);
            let path = self.output_path(&request.data_product, &request.data_module, entity_name);
            write_json_atomic(&path, &document)?;
            crate::log_reverse_info!("Generated entity '{}' -> {}", entity_name, path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Unified entity document for one table.
    ///
    /// Columns whose type cannot be mapped are left out with an error log.
    pub fn build_entity(
        &self,
        entity_name: &str,
        metadata: &TableMetadata,
        data_source: &str,
    ) -> EntityDocument {
        let modified = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let attributes: Vec<AttributeDefinition> = metadata
            .columns
            .iter()
            .filter_map(|column| {
                match self.engine.create_attribute_mapping(column, data_source) {
                    Ok(mapping) => Some(AttributeDefinition {
                        ordinal_number: Some(column.ordinal_position),
                        name: column.name.clone(),
                        display_name: Some(column.name.clone()),
                        description: Some(String::new()),
                        attribute_type: mapping.attribute_type,
                        kind: None,
                        source_data_type: Some(mapping.source_data_type),
                        target_data_type: Some(mapping.target_data_type),
                        tags: Vec::new(),
                        date_modified: Some(modified.clone()),
                    }),
                    Err(e) => {
                        crate::log_reverse_error!("Failed to map attribute '{}': {}", column.name, e);
                        None
                    }
                }
            })
            .collect();

        let keys: Vec<String> = if metadata.primary_keys.is_empty() {
            attributes.first().map(|a| a.name.clone()).into_iter().collect()
        } else {
            metadata.primary_keys.clone()
        };

        let source = SystemSource {
            data_source: data_source.to_string(),
            source_location: metadata.source_location(),
            extract: Some(json!({ "type": "full", "full": {} })),
            mapping: metadata
                .columns
                .iter()
                .map(|c| ColumnMapping {
                    target_name: c.name.clone(),
                    source_name: format!("[{}]", c.name),
                })
                .collect(),
        };

        EntityDocument {
            schema: Some(ENTITY_SCHEMA_REF.to_string()),
            doc_type: UNIFIED_ENTITY_TYPE.to_string(),
            entity: EntityDefinition {
                name: entity_name.to_string(),
                display_name: Some(entity_name.to_string()),
                description: Some(format!(
                    "Staging entity generated from table {}.{}",
                    metadata.schema_name, metadata.table_name
                )),
                data_product: None,
                data_module: None,
                tags: Vec::new(),
                parameters: Vec::new(),
                attribute: attributes,
            },
            functions: Some(Functions {
                trigger: Some(json!({
                    "mode": "schedule",
                    "schedule": { "cronExpression": "0 1 * * *", "timezone": "UTC", "maxRetries": 3 }
                })),
                store: Some(json!({
                    "write_mode": "merge",
                    "merge": { "business_key": keys, "sequential": true },
                    "layout": { "type": "liquid_clustering", "keys": keys },
                    "maintenance": { "retention": "7 days" }
                })),
                sources: vec![json!({ "type": "source", "source": source })],
                other: Default::default(),
            }),
        }
    }

    /// `<stage zone>/<product>/<module>/<entity>.json`
    pub fn output_path(&self, data_product: &str, data_module: &str, entity_name: &str) -> PathBuf {
        self.stage_root
            .join(data_product)
            .join(data_module)
            .join(format!("{}.json", entity_name))
    }

    pub fn stage_root(&self) -> &Path {
        &self.stage_root
    }
}
