//! # dm8gen
//!
//! Core of a metadata-driven generator for layered data-warehouse models.
//! A solution describes a model tree split into four zones (raw, stage, core,
//! curated); every entity document in those zones is addressable by a locator
//! of the form `/<zone>/<product>/<module>/<entity>`.
//!
//! ## Core Components
//!
//! * `index` - Entity index: full builds, incremental refresh, locator resolution
//! * `zones` - Zone registry loaded from `Zones.json`
//! * `mapping` - Hierarchical source-to-canonical type mapping with a TTL/LRU cache
//! * `registry` - Data source, data source type and data type registries
//! * `schema_guard` - Rejection of legacy zone-typed entity documents
//! * `reverse` - Staging entity generation from source system metadata
//! * `model` - Solution-level facade tying the above together
//! * `logging` - Feature-targeted logging on top of `log`/`env_logger`

pub mod cache;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod index;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod registry;
pub mod reverse;
pub mod schema_guard;
pub mod solution;
pub mod zones;

pub use cache::{CacheStats, TtlCache};
pub use config::GeneratorConfig;
pub use document::{DocumentStore, EntityDocument, FsDocumentStore};
pub use error::{ModelError, ModelResult};
pub use index::{
    Index, IndexBuild, IndexBuilder, IndexEntry, IndexStore, Locator, LocatorResolver,
    ResolvedEntity, ScanReport,
};
pub use logging::LoggingSystem;
pub use mapping::{MappingCache, TypeMappingEngine};
pub use model::{Model, RawEntity};
pub use solution::{Solution, SolutionPaths};
pub use zones::{ZoneKind, ZoneRegistry};
