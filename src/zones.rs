//! Zone registry.
//!
//! Maps logical zone names to their on-disk folder, display and target-platform
//! names. Loaded once per solution from `Zones.json`; every zone must carry all
//! four fields or loading fails.

use crate::document::read_json_file;
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The four modeling layers an index is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Raw,
    Stage,
    Core,
    Curated,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 4] = [ZoneKind::Raw, ZoneKind::Stage, ZoneKind::Core, ZoneKind::Curated];

    /// Lower-case name used as the first locator segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Raw => "raw",
            ZoneKind::Stage => "stage",
            ZoneKind::Core => "core",
            ZoneKind::Curated => "curated",
        }
    }

    /// Key of this zone's collection in the index file.
    pub fn index_key(&self) -> &'static str {
        match self {
            ZoneKind::Raw => "rawIndex",
            ZoneKind::Stage => "stageIndex",
            ZoneKind::Core => "coreIndex",
            ZoneKind::Curated => "curatedIndex",
        }
    }

    /// Entries of these zones carry a (lineage) references list.
    pub fn has_references(&self) -> bool {
        matches!(self, ZoneKind::Core | ZoneKind::Curated)
    }

    /// Case-insensitive; accepts `staging` for the stage zone.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "raw" => Some(ZoneKind::Raw),
            "stage" | "staging" => Some(ZoneKind::Stage),
            "core" => Some(ZoneKind::Core),
            "curated" => Some(ZoneKind::Curated),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default)]
    pub name: String,
    /// Spelled `targeName` in zone documents
    #[serde(rename = "targeName", alias = "targetName", default)]
    pub target_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub local_folder_name: String,
}

impl Zone {
    pub fn kind(&self) -> Option<ZoneKind> {
        ZoneKind::from_name(&self.name)
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("targeName", &self.target_name),
            ("displayName", &self.display_name),
            ("localFolderName", &self.local_folder_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ZonesDocument {
    #[serde(default)]
    zones: Vec<Zone>,
}

#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn load(path: &Path) -> ModelResult<Self> {
        let value = read_json_file(path)?;
        let document: ZonesDocument = serde_json::from_value(value)
            .map_err(|e| ModelError::invalid_document(path, e.to_string()))?;

        let registry = Self::new(document.zones)?;
        crate::log_zones_info!(
            "Loaded {} zone(s) from {}: {}",
            registry.zones.len(),
            path.display(),
            registry.zone_names().join(", ")
        );
        Ok(registry)
    }

    /// Validates every zone and reports all incomplete ones together.
    pub fn new(zones: Vec<Zone>) -> ModelResult<Self> {
        let problems: Vec<String> = zones
            .iter()
            .enumerate()
            .filter_map(|(i, zone)| {
                let missing = zone.missing_fields();
                if missing.is_empty() {
                    return None;
                }
                let label = if zone.name.trim().is_empty() {
                    format!("zone #{}", i + 1)
                } else {
                    zone.name.clone()
                };
                Some(format!("{} (missing {})", label, missing.join(", ")))
            })
            .collect();

        if !problems.is_empty() {
            return Err(ModelError::ZoneConfiguration(problems));
        }

        for zone in &zones {
            if zone.kind().is_none() {
                crate::log_zones_debug!(
                    "Zone '{}' is not one of the indexed layers",
                    zone.name
                );
            }
        }

        Ok(Self { zones })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Case-insensitive lookup by logical name.
    pub fn zone(&self, name: &str) -> ModelResult<&Zone> {
        self.zones
            .iter()
            .find(|z| z.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ModelError::UnknownZone(name.to_string()))
    }

    pub fn zone_by_kind(&self, kind: ZoneKind) -> Option<&Zone> {
        self.zones.iter().find(|z| z.kind() == Some(kind))
    }

    pub fn zone_by_target(&self, target_name: &str) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|z| z.target_name.eq_ignore_ascii_case(target_name))
    }

    pub fn zone_by_folder(&self, folder: &str) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|z| z.local_folder_name.eq_ignore_ascii_case(folder))
    }

    pub fn zone_names(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.name.as_str()).collect()
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.target_name.as_str()).collect()
    }

    /// Folder of the zone under the model root.
    pub fn zone_path(&self, model_root: &Path, kind: ZoneKind) -> ModelResult<PathBuf> {
        self.zone_by_kind(kind)
            .map(|z| model_root.join(&z.local_folder_name))
            .ok_or_else(|| ModelError::UnknownZone(kind.to_string()))
    }

    /// Folders of the four indexed zones. Every one of them must be configured.
    pub fn zone_paths(&self, model_root: &Path) -> ModelResult<ZonePaths> {
        let mut paths = ZonePaths::default();
        let mut missing = Vec::new();
        for kind in ZoneKind::ALL {
            match self.zone_by_kind(kind) {
                Some(zone) => paths.set(kind, model_root.join(&zone.local_folder_name)),
                None => missing.push(format!(
                    "Zone '{}' not found in Zones.json; zone configuration is required",
                    kind
                )),
            }
        }

        if !missing.is_empty() {
            crate::log_zones_error!("{}", missing.join("; "));
            return Err(ModelError::ZoneConfiguration(missing));
        }
        Ok(paths)
    }
}

/// Directory per zone, indexed by [`ZoneKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZonePaths {
    paths: [Option<PathBuf>; 4],
}

impl ZonePaths {
    pub fn set(&mut self, kind: ZoneKind, path: PathBuf) {
        self.paths[kind as usize] = Some(path);
    }

    pub fn with(mut self, kind: ZoneKind, path: impl Into<PathBuf>) -> Self {
        self.set(kind, path.into());
        self
    }

    pub fn get(&self, kind: ZoneKind) -> Option<&Path> {
        self.paths[kind as usize].as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneKind, &Path)> {
        ZoneKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|p| (kind, p)))
    }
}
