use super::metadata::{ColumnMetadata, ConnectionInfo, TableMetadata};
use crate::error::{ModelError, ModelResult};
use std::collections::{BTreeMap, HashMap};

/// Metadata access to a live source system.
///
/// Implementations hold their own connection; `connect` is called before any
/// metadata query and `disconnect` once the caller is done.
pub trait SourceConnector: Send {
    fn connection_info(&self) -> &ConnectionInfo;

    fn connect(&mut self) -> ModelResult<()>;

    fn disconnect(&mut self) -> ModelResult<()>;

    fn test_connection(&mut self) -> ModelResult<bool>;

    /// Qualified `schema.table` names, optionally limited to one schema.
    fn discover_tables(&mut self, schema_filter: Option<&str>) -> ModelResult<Vec<String>>;

    fn columns(&mut self, schema: &str, table: &str) -> ModelResult<Vec<ColumnMetadata>>;

    fn primary_keys(&mut self, schema: &str, table: &str) -> ModelResult<Vec<String>>;

    fn foreign_keys(&mut self, schema: &str, table: &str) -> ModelResult<BTreeMap<String, String>>;

    fn unique_constraints(&mut self, schema: &str, table: &str) -> ModelResult<Vec<Vec<String>>>;

    /// Schema assumed for unqualified table names.
    fn default_schema(&self) -> &str {
        "dbo"
    }

    /// Columns plus key information for a possibly qualified table name.
    fn table_metadata(&mut self, table_name: &str) -> ModelResult<TableMetadata> {
        let (schema, table) = parse_table_name(table_name);
        let schema = schema.unwrap_or_else(|| self.default_schema().to_string());

        let mut columns = self.columns(&schema, &table)?;
        let primary_keys = self.primary_keys(&schema, &table)?;
        let foreign_keys = self.foreign_keys(&schema, &table)?;
        let unique_constraints = self.unique_constraints(&schema, &table)?;

        for column in &mut columns {
            column.is_primary_key |= primary_keys.contains(&column.name);
            column.is_foreign_key |= foreign_keys.contains_key(&column.name);
            column.is_unique |= unique_constraints
                .iter()
                .any(|group| group.len() == 1 && group[0] == column.name);
        }
        columns.sort_by_key(|c| c.ordinal_position);

        Ok(TableMetadata {
            schema_name: schema,
            table_name: table,
            table_type: "BASE TABLE".to_string(),
            columns,
            primary_keys,
            foreign_keys,
            unique_constraints,
        })
    }
}

/// Split `schema.table` (or `db.schema.table`) into schema and table.
pub fn parse_table_name(name: &str) -> (Option<String>, String) {
    match name.rsplit_once('.') {
        Some((schema, table)) if !schema.is_empty() => (Some(schema.to_string()), table.to_string()),
        _ => (None, name.to_string()),
    }
}

pub type ConnectorFactory =
    Box<dyn Fn(ConnectionInfo) -> ModelResult<Box<dyn SourceConnector>> + Send + Sync>;

/// Connector factories keyed by data source type name.
#[derive(Default)]
pub struct ConnectorRegistry {
    factories: HashMap<String, ConnectorFactory>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; an existing one for the same type is replaced.
    pub fn register<F>(&mut self, source_type: &str, factory: F)
    where
        F: Fn(ConnectionInfo) -> ModelResult<Box<dyn SourceConnector>> + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(source_type.to_string(), Box::new(factory))
            .is_some()
        {
            crate::log_reverse_warn!(
                "Overriding existing connector for source type '{}'",
                source_type
            );
        }
    }

    pub fn create(&self, info: ConnectionInfo) -> ModelResult<Box<dyn SourceConnector>> {
        let factory = self.factories.get(&info.data_source_type).ok_or_else(|| {
            ModelError::connector(format!(
                "No connector available for data source type '{}'",
                info.data_source_type
            ))
        })?;
        factory(info)
    }

    pub fn source_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
