use super::{AttributeTypeMapping, MappingCache};
use crate::document::DataTypeSpec;
use crate::error::{ModelError, ModelResult};
use crate::registry::{
    DataSourceRegistry, DataSourceTypeRegistry, DataTypeRegistry, TypeMappingRule,
};
use crate::reverse::ColumnMetadata;
use crate::solution::SolutionPaths;
use std::sync::Arc;

/// Resolves source column types to canonical data types.
///
/// Registries are read-only for the engine's lifetime. The optional cache
/// may be shared with other engines and threads.
pub struct TypeMappingEngine {
    data_sources: DataSourceRegistry,
    data_source_types: DataSourceTypeRegistry,
    data_types: DataTypeRegistry,
    cache: Option<Arc<MappingCache>>,
}

impl TypeMappingEngine {
    pub fn new(
        data_sources: DataSourceRegistry,
        data_source_types: DataSourceTypeRegistry,
        data_types: DataTypeRegistry,
    ) -> Self {
        Self {
            data_sources,
            data_source_types,
            data_types,
            cache: None,
        }
    }

    /// Load the three registries from the solution's base folder.
    pub fn load(paths: &SolutionPaths) -> ModelResult<Self> {
        let engine = Self::new(
            DataSourceRegistry::load(&paths.data_sources_file())?,
            DataSourceTypeRegistry::load(&paths.data_source_types_file())?,
            DataTypeRegistry::load(&paths.data_types_file())?,
        );
        crate::log_type_mapping_info!(
            "Loaded {} data source(s), {} data source type(s), {} data type(s)",
            engine.data_sources.len(),
            engine.data_source_types.len(),
            engine.data_types.len()
        );
        Ok(engine)
    }

    pub fn with_cache(mut self, cache: Arc<MappingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<MappingCache>> {
        self.cache.as_ref()
    }

    pub fn data_sources(&self) -> &DataSourceRegistry {
        &self.data_sources
    }

    pub fn data_source_types(&self) -> &DataSourceTypeRegistry {
        &self.data_source_types
    }

    pub fn data_types(&self) -> &DataTypeRegistry {
        &self.data_types
    }

    /// Canonical type name for `source_type` read from `data_source`.
    pub fn resolve_type(&self, data_source: &str, source_type: &str) -> ModelResult<String> {
        let key = (data_source.to_string(), source_type.to_string());
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            crate::log_cache_debug!("Cache hit for {}:{}", data_source, source_type);
            return Ok(cached);
        }

        let resolved = self.resolve_uncached(data_source, source_type)?;
        if let Some(cache) = &self.cache {
            cache.insert(key, resolved.clone());
        }
        Ok(resolved)
    }

    fn resolve_uncached(&self, data_source: &str, source_type: &str) -> ModelResult<String> {
        let source = self.data_sources.get(data_source)?;

        let overrides = source.override_mappings(source_type);
        let token = match Self::pick(&overrides, "override", data_source, source_type) {
            Some(rule) => rule.target_type.clone(),
            None => {
                let source_kind = self
                    .data_source_types
                    .get(&source.source_type)
                    .ok_or_else(|| ModelError::DataSourceTypeNotFound(source.source_type.clone()))?;
                let defaults = source_kind.default_mappings(source_type);
                Self::pick(&defaults, "default", &source.source_type, source_type)
                    .map(|rule| rule.target_type.clone())
                    .ok_or_else(|| ModelError::UnmappedSourceType {
                        data_source: data_source.to_string(),
                        source_type: source_type.to_string(),
                    })?
            }
        };

        Ok(self.canonicalize(&token))
    }

    /// First rule wins; several candidates are tolerated with a warning.
    fn pick<'r>(
        rules: &[&'r TypeMappingRule],
        level: &str,
        owner: &str,
        source_type: &str,
    ) -> Option<&'r TypeMappingRule> {
        if rules.len() > 1 {
            crate::log_type_mapping_warn!(
                "{} {} mappings for '{}' in '{}'; using '{}'",
                rules.len(),
                level,
                source_type,
                owner,
                rules[0].target_type
            );
        }
        rules.first().copied()
    }

    /// Registry name for a type token, or the token itself when unregistered.
    pub fn canonicalize(&self, token: &str) -> String {
        match self.data_types.canonical(token) {
            Some(data_type) => data_type.name.clone(),
            None => {
                crate::log_type_mapping_debug!(
                    "Type '{}' is not in the data type registry; keeping it as is",
                    token
                );
                token.to_string()
            }
        }
    }

    /// Resolve a full source type; nullability and sizes are carried over as given.
    pub fn resolve_data_type(
        &self,
        data_source: &str,
        source: &DataTypeSpec,
    ) -> ModelResult<DataTypeSpec> {
        Ok(DataTypeSpec {
            type_name: self.resolve_type(data_source, &source.type_name)?,
            ..source.clone()
        })
    }

    /// Map a discovered column to source and target data types.
    ///
    /// Length, precision and scale are kept on the target only when the
    /// canonical data type declares the matching capability.
    pub fn create_attribute_mapping(
        &self,
        column: &ColumnMetadata,
        data_source: &str,
    ) -> ModelResult<AttributeTypeMapping> {
        let source_data_type = column.source_data_type();
        let resolved = self.resolve_data_type(data_source, &source_data_type)?;

        let capabilities = self.data_types.get(&resolved.type_name);
        let target_data_type = DataTypeSpec {
            char_len: resolved
                .char_len
                .filter(|_| capabilities.is_some_and(|t| t.has_char_len)),
            precision: resolved
                .precision
                .filter(|_| capabilities.is_some_and(|t| t.has_precision)),
            scale: resolved
                .scale
                .filter(|_| capabilities.is_some_and(|t| t.has_scale)),
            ..resolved
        };

        Ok(AttributeTypeMapping {
            attribute_type: None,
            source_data_type,
            target_data_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DataSource, DataSourceType, DataType};
    use serde_json::json;
    use std::time::Duration;

    fn engine() -> TypeMappingEngine {
        let sources: Vec<DataSource> = serde_json::from_value(json!([
            {
                "name": "Sales",
                "type": "SqlDataSource",
                "dataTypeMapping": [
                    { "sourceType": "varchar", "targetType": "string" },
                    { "sourceType": "money", "targetType": "Decimal" },
                    { "sourceType": "money", "targetType": "Double" }
                ]
            },
            { "name": "Legacy", "type": "MissingType" }
        ]))
        .unwrap();
        let types: Vec<DataSourceType> = serde_json::from_value(json!([{
            "name": "SqlDataSource",
            "dataTypeMapping": [
                { "sourceType": "varchar", "targetType": "text" },
                { "sourceType": "int", "targetType": "Int32" },
                { "sourceType": "xml", "targetType": "XmlDocument" }
            ]
        }]))
        .unwrap();
        let data_types: Vec<DataType> = serde_json::from_value(json!([
            { "name": "UnicodeString", "parquetType": "string", "hasCharLen": true },
            { "name": "Int32", "parquetType": "int32" },
            { "name": "Decimal", "parquetType": "decimal", "hasPrecision": true, "hasScale": true }
        ]))
        .unwrap();

        TypeMappingEngine::new(
            DataSourceRegistry::new(sources),
            DataSourceTypeRegistry::new(types),
            DataTypeRegistry::new(data_types),
        )
    }

    #[test]
    fn override_beats_default_and_is_canonicalized() {
        assert_eq!(engine().resolve_type("Sales", "varchar").unwrap(), "UnicodeString");
    }

    #[test]
    fn falls_back_to_type_defaults() {
        assert_eq!(engine().resolve_type("Sales", "int").unwrap(), "Int32");
    }

    #[test]
    fn unregistered_target_is_returned_unchanged() {
        assert_eq!(engine().resolve_type("Sales", "xml").unwrap(), "XmlDocument");
    }

    #[test]
    fn ambiguous_override_uses_first() {
        assert_eq!(engine().resolve_type("Sales", "money").unwrap(), "Decimal");
    }

    #[test]
    fn error_kinds() {
        let engine = engine();
        assert!(matches!(
            engine.resolve_type("Nope", "int"),
            Err(ModelError::DataSourceNotFound(_))
        ));
        assert!(matches!(
            engine.resolve_type("Legacy", "int"),
            Err(ModelError::DataSourceTypeNotFound(ref t)) if t == "MissingType"
        ));
        assert!(matches!(
            engine.resolve_type("Sales", "geography"),
            Err(ModelError::UnmappedSourceType { .. })
        ));
    }

    #[test]
    fn cache_serves_repeat_lookups_and_skips_failures() {
        let cache = Arc::new(MappingCache::new(
            std::num::NonZeroUsize::new(8).unwrap(),
            Duration::from_secs(60),
        ));
        let engine = engine().with_cache(Arc::clone(&cache));

        engine.resolve_type("Sales", "varchar").unwrap();
        engine.resolve_type("Sales", "varchar").unwrap();
        let _ = engine.resolve_type("Sales", "geography");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(cache.invalidate_source("Sales"), 1);
    }

    #[test]
    fn attribute_mapping_keeps_only_supported_sizes() {
        let engine = engine();
        let column = ColumnMetadata {
            name: "Name".into(),
            data_type: "varchar".into(),
            nullable: false,
            max_length: Some(50),
            precision: Some(10),
            scale: Some(2),
            ..ColumnMetadata::default()
        };

        let mapping = engine.create_attribute_mapping(&column, "Sales").unwrap();
        assert_eq!(mapping.attribute_type, None);
        assert_eq!(mapping.source_data_type.type_name, "varchar");
        assert_eq!(mapping.source_data_type.precision, Some(10));
        assert_eq!(mapping.target_data_type.type_name, "UnicodeString");
        assert_eq!(mapping.target_data_type.char_len, Some(50));
        assert_eq!(mapping.target_data_type.precision, None);
        assert_eq!(mapping.target_data_type.scale, None);
        assert!(!mapping.target_data_type.nullable);

        let money = ColumnMetadata {
            data_type: "money".into(),
            ..column
        };
        let mapping = engine.create_attribute_mapping(&money, "Sales").unwrap();
        assert_eq!(mapping.target_data_type.char_len, None);
        assert_eq!(mapping.target_data_type.precision, Some(10));
        assert_eq!(mapping.target_data_type.scale, Some(2));
    }
}
