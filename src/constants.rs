/// Common constants used across dm8gen.
///
/// These defaults apply when the solution or generator configuration does
/// not provide explicit values.
pub const INDEX_FILE_NAME: &str = "index.json";
pub const ZONES_FILE_NAME: &str = "Zones.json";
pub const DATA_SOURCES_FILE_NAME: &str = "DataSources.json";
pub const DATA_SOURCE_TYPES_FILE_NAME: &str = "DataSourceTypes.json";
pub const DATA_TYPES_FILE_NAME: &str = "DataTypes.json";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "dm8gen.toml";

pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Schema reference written into generated entity documents
pub const ENTITY_SCHEMA_REF: &str = "../../../../.schema/ModelDataEntity.json";
