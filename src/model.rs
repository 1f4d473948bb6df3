//! Solution-level entry point.
//!
//! [`Model`] opens a solution file, validates its zone layout up front and
//! gives access to the entity index, locator lookups and type mapping.

use crate::config::GeneratorConfig;
use crate::document::{DataTypeSpec, DocumentStore, FsDocumentStore};
use crate::error::{ModelError, ModelResult};
use crate::index::{
    Index, IndexBuild, IndexBuilder, IndexStore, LocatorResolver, ResolvedEntity, ScanReport,
};
use crate::mapping::{MappingCache, TypeMappingEngine};
use crate::solution::{Solution, SolutionPaths};
use crate::zones::{ZoneKind, ZonePaths, ZoneRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Model {
    solution: Solution,
    paths: SolutionPaths,
    zones: ZoneRegistry,
    zone_paths: ZonePaths,
    config: GeneratorConfig,
    store: Arc<dyn DocumentStore>,
    cache: Option<Arc<MappingCache>>,
}

/// Raw-layer view of a stage entity fed by an external system.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub data_source: String,
    pub source_location: String,
    pub attributes: Vec<(String, Option<DataTypeSpec>)>,
    /// Stage entity the raw entity was derived from
    pub stage_locator: String,
}

impl Model {
    /// Load the solution and its zone registry; incomplete zones fail here.
    pub fn open(solution_file: impl AsRef<Path>, config: GeneratorConfig) -> ModelResult<Self> {
        let solution_file = solution_file.as_ref();
        let solution = Solution::from_file(solution_file)?;
        let paths = SolutionPaths::resolve(solution_file, &solution);
        let zones = ZoneRegistry::load(&paths.zones_file())?;
        let zone_paths = zones.zone_paths(&paths.model)?;

        let cache = if config.cache.enabled {
            Some(Arc::new(MappingCache::from_config(&config.cache)?))
        } else {
            None
        };

        crate::log_zones_info!(
            "Opened solution '{}' (model at {})",
            solution.name.as_deref().unwrap_or("<unnamed>"),
            paths.model.display()
        );

        Ok(Self {
            solution,
            paths,
            zones,
            zone_paths,
            config,
            store: Arc::new(FsDocumentStore),
            cache,
        })
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn paths(&self) -> &SolutionPaths {
        &self.paths
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn zone_paths(&self) -> &ZonePaths {
        &self.zone_paths
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn mapping_cache(&self) -> Option<&Arc<MappingCache>> {
        self.cache.as_ref()
    }

    pub fn index_store(&self) -> IndexStore {
        IndexStore::new(self.paths.index_file())
    }

    fn builder(&self) -> IndexBuilder<'_> {
        IndexBuilder::new(self.store.as_ref(), &self.zone_paths)
    }

    /// Apply the strictness setting, then persist.
    fn persist(&self, build: IndexBuild) -> ModelResult<IndexBuild> {
        let build = if self.config.index.strict {
            build.strict()?
        } else {
            build
        };
        self.index_store().save(&build.index)?;
        Ok(build)
    }

    /// Full scan; the index file is only replaced if the scan succeeds.
    pub fn build_index(&self) -> ModelResult<IndexBuild> {
        let build = self.builder().build_full()?;
        self.persist(build)
    }

    /// Incremental refresh against the persisted index.
    pub fn refresh_index(&self) -> ModelResult<IndexBuild> {
        let store = self.index_store();
        let existing = store.load()?;
        let since = store.modified()?;
        let build = self.builder().refresh(existing, since)?;
        self.persist(build)
    }

    /// Full scan when requested or when no index exists yet, refresh otherwise.
    pub fn validate_index(&self, full_index_scan: bool) -> ModelResult<ScanReport> {
        let build = if full_index_scan || !self.index_store().exists() {
            self.build_index()?
        } else {
            self.refresh_index()?
        };
        Ok(build.report)
    }

    /// The index is stale when an indexed file is gone or a zone file is newer.
    pub fn is_index_stale(&self) -> ModelResult<bool> {
        let store = self.index_store();
        if !store.exists() {
            return Ok(true);
        }
        let index = store.load()?;
        if index.iter().any(|(_, e)| !e.absolute_path.exists()) {
            return Ok(true);
        }
        Ok(self.builder().has_changes_since(store.modified()?))
    }

    /// Current index, rebuilt or refreshed first when needed.
    pub fn ensure_index(&self) -> ModelResult<Index> {
        let store = self.index_store();
        if !store.exists() {
            crate::log_index_info!("No index at {}, running full scan", store.path().display());
            return Ok(self.build_index()?.index);
        }
        if self.is_index_stale()? {
            crate::log_index_info!("Index at {} is stale, refreshing", store.path().display());
            return Ok(self.refresh_index()?.index);
        }
        store.load()
    }

    pub fn resolver(&self) -> ModelResult<LocatorResolver> {
        Ok(LocatorResolver::with_store(
            self.ensure_index()?,
            Arc::clone(&self.store),
        ))
    }

    pub fn lookup_entity(&self, locator: &str) -> ModelResult<ResolvedEntity> {
        self.resolver()?.lookup_by_locator(locator)
    }

    /// Every entity of a zone, loaded from disk.
    pub fn entities_by_zone(&self, kind: ZoneKind) -> ModelResult<Vec<ResolvedEntity>> {
        self.load_zone(&self.ensure_index()?, kind)
    }

    fn load_zone(&self, index: &Index, kind: ZoneKind) -> ModelResult<Vec<ResolvedEntity>> {
        index
            .entries(kind)
            .iter()
            .map(|entry| {
                Ok(ResolvedEntity {
                    zone: kind,
                    entry: entry.clone(),
                    document: self.store.load_entity(&entry.absolute_path)?,
                })
            })
            .collect()
    }

    pub fn check_zone_for_entities(&self, kind: ZoneKind) -> ModelResult<bool> {
        Ok(!self.ensure_index()?.entries(kind).is_empty())
    }

    /// Raw entities implied by stage entities with a system source.
    pub fn derived_raw_entities(&self) -> ModelResult<Vec<RawEntity>> {
        Ok(self
            .entities_by_zone(ZoneKind::Stage)?
            .into_iter()
            .filter_map(|stage| {
                let source = stage.document.system_sources().into_iter().next()?;
                let entity = &stage.document.entity;
                Some(RawEntity {
                    name: entity.name.clone(),
                    display_name: entity.display_name.clone(),
                    description: entity.description.clone(),
                    data_source: source.data_source,
                    source_location: source.source_location,
                    attributes: stage
                        .document
                        .attributes()
                        .into_iter()
                        .map(|a| (a.name.clone(), a.target_data_type.clone()))
                        .collect(),
                    stage_locator: stage.entry.locator.clone(),
                })
            })
            .collect())
    }

    /// Sanity checks before rendering.
    ///
    /// Logs entity counts per zone and verifies that every model source
    /// locator of core and curated entities resolves. Failed lookups are
    /// logged as warnings and returned.
    pub fn perform_initial_checks(&self, kinds: &[ZoneKind]) -> ModelResult<Vec<ModelError>> {
        let resolver = self.resolver()?;
        let mut problems = Vec::new();

        for &kind in kinds {
            let entities = self.load_zone(resolver.index(), kind)?;
            crate::log_resolver_info!("{} entities to process: {}", kind, entities.len());

            if !kind.has_references() {
                continue;
            }
            for entity in &entities {
                for locator in entity.document.model_source_locators() {
                    match resolver.lookup_by_locator(&locator) {
                        Ok(source) => crate::log_resolver_debug!(
                            "{}: source {} -> {}",
                            entity.entry.locator,
                            locator,
                            source.name()
                        ),
                        Err(e) => {
                            crate::log_resolver_warn!(
                                "Could not look up source entity {} of {}: {}",
                                locator,
                                entity.entry.locator,
                                e
                            );
                            problems.push(e);
                        }
                    }
                }
            }
        }

        crate::log_resolver_info!("Finished initial model checks");
        Ok(problems)
    }

    /// Type mapping over the solution's registries, sharing this model's cache.
    pub fn type_mapping_engine(&self) -> ModelResult<TypeMappingEngine> {
        let engine = TypeMappingEngine::load(&self.paths)?;
        Ok(match &self.cache {
            Some(cache) => engine.with_cache(Arc::clone(cache)),
            None => engine,
        })
    }

    /// Folder new staging entities are written to.
    pub fn stage_path(&self) -> ModelResult<PathBuf> {
        self.zones.zone_path(&self.paths.model, ZoneKind::Stage)
    }
}
