//! Entity index.
//!
//! The index is the persisted catalogue of every entity document, one
//! collection per zone, keyed by locator. It is built by a full scan of the
//! zone folders and kept current by incremental refreshes.

pub mod builder;
pub mod locator;
pub mod resolver;
pub mod store;

pub use builder::{IndexBuild, IndexBuilder, ScanReport};
pub use locator::Locator;
pub use resolver::{LocatorResolver, ResolvedEntity};
pub use store::IndexStore;

use crate::error::{ModelError, ModelResult};
use crate::zones::ZoneKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub locator: String,
    pub name: String,
    #[serde(alias = "absPath")]
    pub absolute_path: PathBuf,
    /// Lineage references; only present on core and curated entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
}

impl IndexEntry {
    pub fn new(kind: ZoneKind, locator: &Locator, absolute_path: PathBuf) -> Self {
        Self {
            locator: locator.to_string(),
            name: locator.entity_name.clone(),
            absolute_path,
            references: kind.has_references().then(Vec::new),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneIndex {
    #[serde(default)]
    pub entry: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default)]
    pub raw_index: ZoneIndex,
    #[serde(default)]
    pub stage_index: ZoneIndex,
    #[serde(default)]
    pub core_index: ZoneIndex,
    #[serde(default)]
    pub curated_index: ZoneIndex,
}

impl Index {
    pub fn entries(&self, kind: ZoneKind) -> &[IndexEntry] {
        match kind {
            ZoneKind::Raw => &self.raw_index.entry,
            ZoneKind::Stage => &self.stage_index.entry,
            ZoneKind::Core => &self.core_index.entry,
            ZoneKind::Curated => &self.curated_index.entry,
        }
    }

    pub fn entries_mut(&mut self, kind: ZoneKind) -> &mut Vec<IndexEntry> {
        match kind {
            ZoneKind::Raw => &mut self.raw_index.entry,
            ZoneKind::Stage => &mut self.stage_index.entry,
            ZoneKind::Core => &mut self.core_index.entry,
            ZoneKind::Curated => &mut self.curated_index.entry,
        }
    }

    pub fn push(&mut self, kind: ZoneKind, entry: IndexEntry) {
        self.entries_mut(kind).push(entry);
    }

    /// All entries with their zone, in zone order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneKind, &IndexEntry)> {
        ZoneKind::ALL
            .into_iter()
            .flat_map(move |kind| self.entries(kind).iter().map(move |e| (kind, e)))
    }

    pub fn len(&self) -> usize {
        ZoneKind::ALL.iter().map(|k| self.entries(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_locator(&self, locator: &str) -> bool {
        let wanted = locator.to_lowercase();
        self.iter()
            .any(|(_, e)| e.locator.to_lowercase() == wanted)
    }

    /// Lower-cased locators of every entry.
    pub fn locators(&self) -> HashSet<String> {
        self.iter().map(|(_, e)| e.locator.to_lowercase()).collect()
    }

    /// Fails on the first locator that occurs twice (case-insensitive).
    pub fn validate_unique(&self) -> ModelResult<()> {
        let mut seen: HashMap<String, &IndexEntry> = HashMap::with_capacity(self.len());
        for (_, entry) in self.iter() {
            if let Some(first) = seen.insert(entry.locator.to_lowercase(), entry) {
                return Err(ModelError::DuplicateLocatorDetected {
                    locator: entry.locator.clone(),
                    first: first.absolute_path.clone(),
                    second: entry.absolute_path.clone(),
                });
            }
        }
        Ok(())
    }
}
