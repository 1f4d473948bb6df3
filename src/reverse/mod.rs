//! Reverse engineering: staging entities from live source metadata.
//!
//! Connectors for concrete database engines are registered by the caller in a
//! [`ConnectorRegistry`]; this module only defines the interface and the
//! document generation on top of it.

pub mod connector;
pub mod generator;
pub mod metadata;

pub use connector::{parse_table_name, ConnectorFactory, ConnectorRegistry, SourceConnector};
pub use generator::{GenerationRequest, ReverseGenerator};
pub use metadata::{ColumnMetadata, ConnectionInfo, TableMetadata};
