//! Document store: reading and writing JSON model documents.

pub mod entity;

pub use entity::{
    AttributeDefinition, ColumnMapping, DataTypeSpec, EntityDefinition, EntityDocument,
    Functions, SystemSource,
};

use crate::error::{ModelError, ModelResult};
use crate::schema_guard;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Source of parsed model documents.
pub trait DocumentStore: Send + Sync {
    /// Read and parse a JSON document.
    fn read_json(&self, path: &Path) -> ModelResult<Value>;

    /// Read an entity document, rejecting legacy schemas and malformed shapes.
    fn load_entity(&self, path: &Path) -> ModelResult<EntityDocument> {
        let value = self.read_json(path)?;
        schema_guard::ensure_unified(path, &value)?;
        EntityDocument::from_value(path, value)
    }
}

/// [`DocumentStore`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read_json(&self, path: &Path) -> ModelResult<Value> {
        read_json_file(path)
    }
}

pub fn read_json_file(path: &Path) -> ModelResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ModelError::json_parse(path, e))
}

/// Serialize `value` as 4-space indented JSON.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `value` to `path` through a temp file in the same directory and an
/// atomic rename. On failure the previous file content is left untouched.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> ModelResult<()> {
    let bytes = to_pretty_json(value)
        .map_err(|e| ModelError::invalid_document(path, format!("serialization failed: {}", e)))?;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| ModelError::io(parent, e))?;
    temp.write_all(&bytes).map_err(|e| ModelError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ModelError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| ModelError::io(path, e.error))?;
    Ok(())
}
