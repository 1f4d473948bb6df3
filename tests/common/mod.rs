//! Shared fixtures for the integration tests.
//!
//! [`SolutionFixture`] lays out a complete solution in a temporary directory:
//! a solution file, the base registries and one folder per zone.

#![allow(dead_code)]

use dm8gen::{GeneratorConfig, Model, ModelResult, ZoneKind};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub struct SolutionFixture {
    pub dir: TempDir,
    pub solution_file: PathBuf,
}

impl SolutionFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_zones(default_zones())
    }

    /// Solution whose `Zones.json` holds `zones` verbatim.
    pub fn with_zones(zones: Value) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let solution_file = dir.path().join("Sales.dm8s");
        write_json(
            &solution_file,
            &json!({
                "name": "Sales",
                "schemaVersion": "2.0.0",
                "basePath": "Base",
                "modelPath": "Model",
                "generatePath": "Generate",
                "outputPath": "Output"
            }),
        )?;

        let fixture = Self { dir, solution_file };
        fixture.write_base("Zones.json", &zones)?;
        fixture.write_base("DataSourceTypes.json", &data_source_types())?;
        fixture.write_base("DataSources.json", &data_sources())?;
        fixture.write_base("DataTypes.json", &data_types())?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn base_dir(&self) -> PathBuf {
        self.root().join("Base")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root().join("Model")
    }

    pub fn index_file(&self) -> PathBuf {
        self.model_dir().join("index.json")
    }

    pub fn zone_dir(&self, kind: ZoneKind) -> PathBuf {
        let folder = match kind {
            ZoneKind::Raw => "010-Raw",
            ZoneKind::Stage => "020-Stage",
            ZoneKind::Core => "030-Core",
            ZoneKind::Curated => "040-Curated",
        };
        self.model_dir().join(folder)
    }

    pub fn write_base(&self, file_name: &str, value: &Value) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self.base_dir().join(file_name);
        write_json(&path, value)?;
        Ok(path)
    }

    /// Write `<zone>/<product>/<module>/<file_name>.json`, back-dated so it is
    /// older than any index written afterwards.
    pub fn write_entity(
        &self,
        kind: ZoneKind,
        product: &str,
        module: &str,
        file_name: &str,
        document: &Value,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self
            .zone_dir(kind)
            .join(product)
            .join(module)
            .join(format!("{}.json", file_name));
        write_json(&path, document)?;
        set_mtime(&path, hours_ago(2))?;
        Ok(path)
    }

    /// Write raw text under the zone folder, back-dated like `write_entity`.
    pub fn write_raw(
        &self,
        kind: ZoneKind,
        relative: &str,
        content: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self.zone_dir(kind).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        set_mtime(&path, hours_ago(2))?;
        Ok(path)
    }

    pub fn open(&self) -> ModelResult<Model> {
        self.open_with(GeneratorConfig::default())
    }

    pub fn open_with(&self, config: GeneratorConfig) -> ModelResult<Model> {
        Model::open(&self.solution_file, config)
    }

    /// Move the index file's timestamp back so later writes count as changes.
    pub fn age_index(&self) -> std::io::Result<()> {
        set_mtime(&self.index_file(), hours_ago(1))
    }
}

pub fn write_json(path: &Path, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn set_mtime(path: &Path, time: SystemTime) -> std::io::Result<()> {
    File::options().write(true).open(path)?.set_modified(time)
}

pub fn hours_ago(hours: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(hours * 3600)
}

pub fn default_zones() -> Value {
    json!({
        "zones": [
            { "name": "raw", "targeName": "bronze", "displayName": "Raw", "localFolderName": "010-Raw" },
            { "name": "stage", "targeName": "silver", "displayName": "Stage", "localFolderName": "020-Stage" },
            { "name": "core", "targeName": "gold", "displayName": "Core", "localFolderName": "030-Core" },
            { "name": "curated", "targeName": "platinum", "displayName": "Curated", "localFolderName": "040-Curated" }
        ]
    })
}

pub fn data_source_types() -> Value {
    json!({
        "type": "dataSourceTypes",
        "dataSourceTypes": [
            {
                "name": "SqlDataSource",
                "displayName": "SQL Server",
                "dataTypeMapping": [
                    { "sourceType": "nvarchar", "targetType": "string" },
                    { "sourceType": "int", "targetType": "int32" },
                    { "sourceType": "money", "targetType": "double" },
                    { "sourceType": "datetime2", "targetType": "timestamp" },
                    { "sourceType": "decimal", "targetType": "decimal" },
                    { "sourceType": "xml", "targetType": "xmldoc" }
                ],
                "connectionProperties": [
                    { "name": "connectionString", "required": true },
                    { "name": "timeout", "required": false }
                ]
            }
        ]
    })
}

pub fn data_sources() -> Value {
    json!([
        {
            "name": "Sales",
            "type": "SqlDataSource",
            "connectionString": "Server=localhost;Database=Sales",
            "dataTypeMapping": [
                { "sourceType": "money", "targetType": "decimal" }
            ]
        },
        {
            "name": "Archive",
            "type": "SqlDataSource"
        },
        {
            "name": "Mainframe",
            "type": "Db2DataSource",
            "connectionString": "DSN=HOST"
        }
    ])
}

pub fn data_types() -> Value {
    json!([
        { "name": "string", "hasCharLen": true, "parquetType": "string" },
        { "name": "int", "parquetType": "int32" },
        { "name": "double", "parquetType": "double" },
        { "name": "decimal", "hasPrecision": true, "hasScale": true, "parquetType": "decimal" },
        { "name": "datetime", "parquetType": "timestamp" }
    ])
}

/// Minimal unified entity document.
pub fn entity(name: &str) -> Value {
    json!({
        "$schema": "../../../../.schema/ModelDataEntity.json",
        "type": "entity",
        "entity": {
            "name": name,
            "displayName": name,
            "attribute": [
                {
                    "ordinalNumber": 2,
                    "name": "Name",
                    "type": "Attribute",
                    "targetDataType": { "type": "string", "nullable": true, "charLen": 50 }
                },
                {
                    "ordinalNumber": 1,
                    "name": "Id",
                    "type": "BK",
                    "targetDataType": { "type": "int", "nullable": false }
                }
            ]
        }
    })
}

/// Stage entity fed from a source system table.
pub fn stage_entity(name: &str, data_source: &str, location: &str) -> Value {
    let mut document = entity(name);
    document["functions"] = json!({
        "sources": [
            {
                "type": "source",
                "source": {
                    "dataSource": data_source,
                    "sourceLocation": location,
                    "mapping": [
                        { "targetName": "Id", "sourceName": "[Id]" },
                        { "targetName": "Name", "sourceName": "[Name]" }
                    ]
                }
            }
        ]
    });
    document
}

/// Core or curated entity built from other model entities.
pub fn derived_entity(name: &str, source_locators: &[&str]) -> Value {
    let mut document = entity(name);
    let sources: Vec<Value> = source_locators
        .iter()
        .map(|locator| json!({ "type": "model", "model": { "dm8l": locator } }))
        .collect();
    document["functions"] = json!({ "sources": sources });
    document
}

/// Per-zone document of the pre-unified schema.
pub fn legacy_entity(zone: &str, name: &str) -> Value {
    json!({
        "type": zone,
        "entity": { "name": name, "attribute": [] },
        "function": { "dataSource": "Sales" }
    })
}
