//! Solution file (`*.dm8s`) loading and path resolution.

use crate::constants::{
    DATA_SOURCES_FILE_NAME, DATA_SOURCE_TYPES_FILE_NAME, DATA_TYPES_FILE_NAME, INDEX_FILE_NAME,
    ZONES_FILE_NAME,
};
use crate::document::read_json_file;
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The solution document as stored on disk.
///
/// Paths are relative to the directory containing the solution file unless
/// they are absolute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema_version: Option<String>,
    pub base_path: Option<String>,
    pub model_path: Option<String>,
    pub generate_path: Option<String>,
    pub output_path: Option<String>,
    #[serde(default)]
    pub diagram_path: Option<String>,
}

impl Solution {
    pub fn from_file(path: &Path) -> ModelResult<Self> {
        let value = read_json_file(path)?;
        let solution: Solution = serde_json::from_value(value)
            .map_err(|e| ModelError::invalid_document(path, e.to_string()))?;

        let missing: Vec<&str> = [
            ("basePath", &solution.base_path),
            ("modelPath", &solution.model_path),
            ("generatePath", &solution.generate_path),
            ("outputPath", &solution.output_path),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(ModelError::invalid_document(
                path,
                format!("missing solution properties: {}", missing.join(", ")),
            ));
        }

        Ok(solution)
    }
}

/// Absolute locations derived from a [`Solution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionPaths {
    pub solution_file: PathBuf,
    pub base: PathBuf,
    pub model: PathBuf,
    pub generate: PathBuf,
    pub output: PathBuf,
    pub diagram: Option<PathBuf>,
}

impl SolutionPaths {
    pub fn resolve(solution_file: &Path, solution: &Solution) -> Self {
        let root = solution_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let join = |value: &Option<String>| -> PathBuf {
            match value.as_deref() {
                Some(v) if Path::new(v).is_absolute() => PathBuf::from(v),
                Some(v) => root.join(v),
                None => root.clone(),
            }
        };

        Self {
            solution_file: solution_file.to_path_buf(),
            base: join(&solution.base_path),
            model: join(&solution.model_path),
            generate: join(&solution.generate_path),
            output: join(&solution.output_path),
            diagram: solution.diagram_path.as_ref().map(|_| join(&solution.diagram_path)),
        }
    }

    pub fn index_file(&self) -> PathBuf {
        self.model.join(INDEX_FILE_NAME)
    }

    pub fn zones_file(&self) -> PathBuf {
        self.base.join(ZONES_FILE_NAME)
    }

    pub fn data_sources_file(&self) -> PathBuf {
        self.base.join(DATA_SOURCES_FILE_NAME)
    }

    pub fn data_source_types_file(&self) -> PathBuf {
        self.base.join(DATA_SOURCE_TYPES_FILE_NAME)
    }

    pub fn data_types_file(&self) -> PathBuf {
        self.base.join(DATA_TYPES_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_relative_paths_against_solution_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Sample.dm8s");
        std::fs::write(
            &file,
            r#"{
                "name": "Sample",
                "schemaVersion": "2.0.0",
                "basePath": "Base",
                "modelPath": "Model",
                "generatePath": "Generate",
                "outputPath": "Output"
            }"#,
        )
        .unwrap();

        let solution = Solution::from_file(&file).unwrap();
        let paths = SolutionPaths::resolve(&file, &solution);
        assert_eq!(paths.base, dir.path().join("Base"));
        assert_eq!(paths.index_file(), dir.path().join("Model").join("index.json"));
        assert_eq!(paths.zones_file(), dir.path().join("Base").join("Zones.json"));
        assert!(paths.diagram.is_none());
    }

    #[test]
    fn reports_every_missing_property() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Broken.dm8s");
        std::fs::write(&file, r#"{"name": "Broken", "basePath": "Base"}"#).unwrap();

        let err = Solution::from_file(&file).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("modelPath"));
        assert!(msg.contains("generatePath"));
        assert!(msg.contains("outputPath"));
        assert!(!msg.contains("basePath"));
    }
}
