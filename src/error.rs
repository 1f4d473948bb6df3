//! Error types shared by every dm8gen component.
//!
//! Every variant that originates from a file carries the offending path so a
//! failed index build or lookup can be traced back to the document on disk.

use std::io;
use std::path::{Path, PathBuf};

/// Unified error type for model loading, index maintenance and type resolution.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Locator pattern does not have the `/<zone>/<product>/<module>/<entity>` shape
    #[error("Invalid locator '{0}': expected /<zone>/<dataProduct>/<dataModule>/<entityName>")]
    InvalidLocator(String),

    /// No index entry matched the locator
    #[error("Locator not found: {0}")]
    LocatorNotFound(String),

    /// More than one index entry matched the locator
    #[error("Multiple locators found for '{pattern}': {}", .matches.join(", "))]
    MultipleLocatorsFound {
        pattern: String,
        matches: Vec<String>,
    },

    /// Two entity documents produce the same locator
    #[error(
        "Duplicate locator '{locator}' detected in {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateLocatorDetected {
        locator: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Document still uses the per-zone (v1) schema
    #[error(
        "Entity at {} uses deprecated v1 schema format (type: {found_type}). Please migrate to the unified v2 entity schema (type: entity).",
        .path.display()
    )]
    LegacySchemaDetected { path: PathBuf, found_type: String },

    #[error("Data source not found: {0}")]
    DataSourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceTypeNotFound(String),

    /// Neither the data source overrides nor the data source type defaults map the token
    #[error("No type mapping for source type '{source_type}' in data source '{data_source}'")]
    UnmappedSourceType {
        data_source: String,
        source_type: String,
    },

    /// Malformed JSON document
    #[error("JSON parse error in {}: {source}", .path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON that does not have the expected document shape
    #[error("Invalid document {}: {message}", .path.display())]
    InvalidDocument { path: PathBuf, message: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One or more zones are missing required fields
    #[error("Zone configuration incomplete: {}", .0.join(", "))]
    ZoneConfiguration(Vec<String>),

    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Index file not found at {}; run a full index scan", .0.display())]
    IndexNotFound(PathBuf),

    /// Aggregated per-file errors from an index scan
    #[error("{} model file(s) failed to parse:\n{}", .0.len(), format_errors(.0))]
    ModelParse(Vec<ModelError>),

    #[error("Connector error: {0}")]
    Connector(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ModelError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json_parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_document<S: Into<String>>(path: impl AsRef<Path>, message: S) -> Self {
        Self::InvalidDocument {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn connector<S: Into<String>>(message: S) -> Self {
        Self::Connector(message.into())
    }

    /// Path of the document the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::LegacySchemaDetected { path, .. }
            | Self::JsonParse { path, .. }
            | Self::InvalidDocument { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::DuplicateLocatorDetected { second, .. } => Some(second),
            Self::IndexNotFound(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for dm8gen operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_error_names_both_paths() {
        let err = ModelError::DuplicateLocatorDetected {
            locator: "/stage/Sales/Product/Product".to_string(),
            first: PathBuf::from("/m/a.json"),
            second: PathBuf::from("/m/b.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/m/a.json"));
        assert!(msg.contains("/m/b.json"));
    }

    #[test]
    fn aggregate_lists_each_error() {
        let err = ModelError::ModelParse(vec![
            ModelError::invalid_document("/m/x.json", "missing entity"),
            ModelError::UnknownZone("bronze".to_string()),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 model file(s)"));
        assert!(msg.contains("/m/x.json"));
        assert!(msg.contains("bronze"));
    }
}
