use super::Index;
use crate::document::{read_json_file, write_json_atomic};
use crate::error::{ModelError, ModelResult};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Location of the persisted index file.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> ModelResult<Index> {
        if !self.exists() {
            return Err(ModelError::IndexNotFound(self.path.clone()));
        }
        let value = read_json_file(&self.path)?;
        serde_json::from_value(value)
            .map_err(|e| ModelError::invalid_document(&self.path, e.to_string()))
    }

    /// Replace the index file atomically.
    pub fn save(&self, index: &Index) -> ModelResult<()> {
        write_json_atomic(&self.path, index)?;
        crate::log_index_info!(
            "Index with {} entries written to {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Modification time of the index file; refresh discovers files newer than this.
    pub fn modified(&self) -> ModelResult<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| ModelError::io(&self.path, e))
    }
}
