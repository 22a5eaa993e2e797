//! Core library for colproxy.
//!
//! colproxy puts a local metadata oracle in front of a SQL-transformation
//! engine's column lookups. When the engine asks a warehouse adapter for
//! the columns of a relation, the oracle answers first with one of three
//! outcomes:
//! - a column list, returned without touching the warehouse
//! - "known absent", returned as an empty column list
//! - "no opinion", which defers to the adapter's real implementation
//!
//! # Architecture
//! - `relation`: normalizes `(database, schema, identifier)` into the wire key
//! - `oracle`: HTTP client and response classification
//! - `adapters`: the column-resolution capability, the proxy decorator,
//!   per-family type translation and the registration interceptor

pub mod adapters;
pub mod error;
pub mod logging;
pub mod models;
pub mod oracle;
pub mod relation;

// Re-export commonly used types
pub use adapters::{
    AdapterConfig, AdapterFactory, AdapterRegistry, ColumnResolver, InterceptingFactory,
    OracleProxyResolver, TypeTranslator, translator_for,
};
pub use error::{ColProxyError, Result};
pub use logging::init_logging;
pub use models::{AdapterFamily, Column, ColumnDescriptor, RelationKey, ResolutionOutcome};
pub use oracle::{HttpOracle, MetadataOracle, OracleConfig};
pub use relation::{NONE_SENTINEL, NormalizedKey, normalize};
