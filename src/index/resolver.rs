//! Locator resolution against a loaded index.

use super::{Index, IndexEntry, Locator};
use crate::document::{DocumentStore, EntityDocument, FsDocumentStore};
use crate::error::{ModelError, ModelResult};
use crate::zones::ZoneKind;
use std::sync::Arc;

/// An index entry together with its parsed entity document.
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub zone: ZoneKind,
    pub entry: IndexEntry,
    pub document: EntityDocument,
}

impl ResolvedEntity {
    pub fn name(&self) -> &str {
        self.document.name()
    }
}

pub struct LocatorResolver {
    index: Index,
    store: Arc<dyn DocumentStore>,
}

impl LocatorResolver {
    pub fn new(index: Index) -> Self {
        Self::with_store(index, Arc::new(FsDocumentStore))
    }

    pub fn with_store(index: Index, store: Arc<dyn DocumentStore>) -> Self {
        Self { index, store }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Resolve a locator to exactly one entry.
    ///
    /// Matching is exact string equality after lower-casing; the leading
    /// slash is optional. The bare root `/` matches every entry, so it only
    /// succeeds on an index holding a single entity.
    pub fn resolve(&self, pattern: &str) -> ModelResult<&IndexEntry> {
        self.resolve_in_zone(pattern).map(|(_, entry)| entry)
    }

    /// Like [`resolve`](Self::resolve), also reporting the zone of the entry.
    pub fn resolve_in_zone(&self, pattern: &str) -> ModelResult<(ZoneKind, &IndexEntry)> {
        let matches: Vec<(ZoneKind, &IndexEntry)> = if pattern.trim() == "/" {
            self.index.iter().collect()
        } else {
            let wanted = Locator::normalize(pattern)?.to_lowercase();
            self.index
                .iter()
                .filter(|(_, entry)| entry.locator.to_lowercase() == wanted)
                .collect()
        };

        match matches.as_slice() {
            [] => Err(ModelError::LocatorNotFound(pattern.to_string())),
            [single] => Ok(*single),
            many => {
                crate::log_resolver_error!(
                    "Locator '{}' matched {} entries; the index is inconsistent",
                    pattern,
                    many.len()
                );
                Err(ModelError::MultipleLocatorsFound {
                    pattern: pattern.to_string(),
                    matches: many.iter().map(|(_, e)| e.locator.clone()).collect(),
                })
            }
        }
    }

    /// Resolve and load the entity document, re-checking its schema version.
    pub fn lookup_by_locator(&self, locator: &str) -> ModelResult<ResolvedEntity> {
        let (zone, entry) = self.resolve_in_zone(locator)?;
        crate::log_resolver_debug!(
            "Loading {} from {}",
            entry.locator,
            entry.absolute_path.display()
        );
        let document = self.store.load_entity(&entry.absolute_path)?;
        Ok(ResolvedEntity {
            zone,
            entry: entry.clone(),
            document,
        })
    }
}
