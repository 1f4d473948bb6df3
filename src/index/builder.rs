//! Full and incremental index builds.

use super::{Index, IndexEntry, Locator};
use crate::document::{DocumentStore, EntityDocument};
use crate::error::{ModelError, ModelResult};
use crate::schema_guard;
use crate::zones::{ZoneKind, ZonePaths};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Per-file outcome of a scan that did not stop it.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files that could not be read, parsed or located
    pub errors: Vec<ModelError>,
    /// Documents skipped because they use the legacy schema
    pub skipped_legacy: Vec<PathBuf>,
    pub added: usize,
    pub pruned: usize,
    /// Changed files whose locator was already indexed
    pub unchanged: usize,
}

impl ScanReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of a build: the new index plus what happened along the way.
#[derive(Debug)]
pub struct IndexBuild {
    pub index: Index,
    pub report: ScanReport,
}

impl IndexBuild {
    /// Turn accumulated per-file errors into one aggregate error.
    pub fn strict(mut self) -> ModelResult<Self> {
        if self.report.has_errors() {
            return Err(ModelError::ModelParse(std::mem::take(&mut self.report.errors)));
        }
        Ok(self)
    }
}

enum Scanned {
    Entry(IndexEntry),
    Legacy,
}

pub struct IndexBuilder<'a> {
    store: &'a dyn DocumentStore,
    zone_paths: &'a ZonePaths,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(store: &'a dyn DocumentStore, zone_paths: &'a ZonePaths) -> Self {
        Self { store, zone_paths }
    }

    /// Scan every zone folder from scratch.
    ///
    /// Unreadable or malformed files are collected in the report and left
    /// out. A duplicate locator fails the whole build.
    pub fn build_full(&self) -> ModelResult<IndexBuild> {
        let mut index = Index::default();
        let mut report = ScanReport::default();

        for (kind, root) in self.zone_paths.iter() {
            crate::log_index_debug!("Scanning {} zone at {}", kind, root.display());
            for path in self.zone_files(root, &mut report) {
                match self.scan_file(kind, root, &path) {
                    Ok(Scanned::Entry(entry)) => {
                        index.push(kind, entry);
                        report.added += 1;
                    }
                    Ok(Scanned::Legacy) => report.skipped_legacy.push(path),
                    Err(e) => {
                        crate::log_index_error!("{}", e);
                        report.errors.push(e);
                    }
                }
            }
        }

        index.validate_unique()?;
        Self::log_summary("Full index scan", &index, &report);
        Ok(IndexBuild { index, report })
    }

    /// Prune entries whose file is gone, then add files modified after `since`.
    pub fn refresh(&self, mut index: Index, since: SystemTime) -> ModelResult<IndexBuild> {
        let mut report = ScanReport::default();

        for kind in ZoneKind::ALL {
            let entries = index.entries_mut(kind);
            let before = entries.len();
            entries.retain(|entry| {
                let keep = entry.absolute_path.exists();
                if !keep {
                    crate::log_index_info!(
                        "Removing {} from index: {} no longer exists",
                        entry.locator,
                        entry.absolute_path.display()
                    );
                }
                keep
            });
            report.pruned += before - entries.len();
        }

        // New files are compared with the pruned entries only, so two new
        // files sharing a locator still collide below.
        let known = index.locators();

        for (kind, root) in self.zone_paths.iter() {
            for path in self.zone_files(root, &mut report) {
                match Self::modified_after(&path, since) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        report.errors.push(e);
                        continue;
                    }
                }

                match self.scan_file(kind, root, &path) {
                    Ok(Scanned::Entry(entry)) => {
                        if known.contains(&entry.locator.to_lowercase()) {
                            crate::log_index_info!(
                                "{} already in index, skipping {}",
                                entry.locator,
                                path.display()
                            );
                            report.unchanged += 1;
                        } else {
                            crate::log_index_info!("Adding {} to index", entry.locator);
                            index.push(kind, entry);
                            report.added += 1;
                        }
                    }
                    Ok(Scanned::Legacy) => report.skipped_legacy.push(path),
                    Err(e) => {
                        crate::log_index_error!("{}", e);
                        report.errors.push(e);
                    }
                }
            }
        }

        index.validate_unique()?;
        Self::log_summary("Index refresh", &index, &report);
        Ok(IndexBuild { index, report })
    }

    /// True when any zone file was modified after `since`.
    pub fn has_changes_since(&self, since: SystemTime) -> bool {
        let mut report = ScanReport::default();
        self.zone_paths.iter().any(|(_, root)| {
            self.zone_files(root, &mut report)
                .iter()
                .any(|path| Self::modified_after(path, since).unwrap_or(true))
        })
    }

    /// `*.json` files below `root`, in a stable order.
    fn zone_files(&self, root: &Path, report: &mut ScanReport) -> Vec<PathBuf> {
        if !root.is_dir() {
            crate::log_index_warn!("Zone folder {} does not exist", root.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        for item in WalkDir::new(root).sort_by_file_name() {
            match item {
                Ok(entry) => {
                    let is_json = entry
                        .path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                    if entry.file_type().is_file() && is_json {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    report.errors.push(ModelError::io(path, e.into()));
                }
            }
        }
        files
    }

    fn modified_after(path: &Path, since: SystemTime) -> ModelResult<bool> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| ModelError::io(path, e))?;
        Ok(modified > since)
    }

    fn scan_file(&self, kind: ZoneKind, root: &Path, path: &Path) -> ModelResult<Scanned> {
        let value = self.store.read_json(path)?;

        if schema_guard::is_legacy_schema(&value) {
            crate::log_index_warn!(
                "Skipping {}: legacy schema (type: {}). Migrate it to the unified entity schema.",
                path.display(),
                value.get("type").and_then(Value::as_str).unwrap_or("<none>")
            );
            return Ok(Scanned::Legacy);
        }

        let document = EntityDocument::from_value(path, value)?;
        let locator = Self::derive_locator(kind, root, path, &document)?;
        Ok(Scanned::Entry(IndexEntry::new(kind, &locator, path.to_path_buf())))
    }

    /// Product and module come from the document when declared, otherwise
    /// from `<zone folder>/<product>/<module>/...`.
    fn derive_locator(
        kind: ZoneKind,
        root: &Path,
        path: &Path,
        document: &EntityDocument,
    ) -> ModelResult<Locator> {
        let folders: Vec<String> = path
            .strip_prefix(root)
            .ok()
            .and_then(Path::parent)
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();

        let entity = &document.entity;
        let product = entity
            .data_product
            .clone()
            .or_else(|| folders.first().cloned());
        let module = entity
            .data_module
            .clone()
            .or_else(|| folders.get(1).cloned());

        match (product, module) {
            (Some(product), Some(module)) => {
                let locator = Locator::new(kind.as_str(), product, module, entity.name.clone());
                // segments must not contain '/' or be blank
                Locator::parse(&locator.to_string()).map_err(|_| {
                    ModelError::invalid_document(
                        path,
                        format!("cannot build a valid locator from '{}'", locator),
                    )
                })
            }
            _ => Err(ModelError::invalid_document(
                path,
                "entity must live under <zone>/<dataProduct>/<dataModule>/ or declare dataProduct and dataModule",
            )),
        }
    }

    fn log_summary(operation: &str, index: &Index, report: &ScanReport) {
        crate::log_index_info!(
            "{} finished: {} entries ({} added, {} pruned, {} unchanged, {} legacy skipped, {} errors)",
            operation,
            index.len(),
            report.added,
            report.pruned,
            report.unchanged,
            report.skipped_legacy.len(),
            report.errors.len()
        );
        if report.has_errors() {
            crate::log_index_warn!(
                "{} model file(s) could not be indexed:",
                report.errors.len()
            );
            for error in &report.errors {
                crate::log_index_warn!("  {}", error);
            }
        }
    }
}
