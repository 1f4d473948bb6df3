//! Schema-version guard.
//!
//! Entity documents written before the unified schema carry the zone name in
//! their `type` field (`raw`, `stage`, `core`, `curated`) or split the model
//! into `function` + `entity` blocks. Those shapes are incompatible with the
//! unified entity document and are rejected wherever a document is read.

use crate::error::{ModelError, ModelResult};
use serde_json::Value;
use std::path::Path;

/// `type` values used by the per-zone schema.
pub const LEGACY_ZONE_TYPES: [&str; 4] = ["raw", "stage", "core", "curated"];

/// The `type` value of a unified entity document.
pub const UNIFIED_ENTITY_TYPE: &str = "entity";

/// True when the document uses the deprecated per-zone schema.
pub fn is_legacy_schema(document: &Value) -> bool {
    let Some(object) = document.as_object() else {
        return false;
    };
    let doc_type = object.get("type").and_then(Value::as_str);

    if doc_type.is_some_and(|t| LEGACY_ZONE_TYPES.contains(&t)) {
        return true;
    }

    object.contains_key("function")
        && object.contains_key("entity")
        && doc_type != Some(UNIFIED_ENTITY_TYPE)
}

/// Fails with [`ModelError::LegacySchemaDetected`] for legacy documents.
pub fn ensure_unified(path: &Path, document: &Value) -> ModelResult<()> {
    if is_legacy_schema(document) {
        let found_type = document
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<none>")
            .to_string();
        return Err(ModelError::LegacySchemaDetected {
            path: path.to_path_buf(),
            found_type,
        });
    }
    Ok(())
}
