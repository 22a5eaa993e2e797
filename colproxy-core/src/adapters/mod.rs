//! Column-resolution adapters and the oracle interception layer.
//!
//! This module defines the capability every warehouse adapter exposes to
//! the host engine (resolving the columns of a relation) and the pieces
//! that put the metadata oracle in front of it.
//!
//! # Module Structure
//! - `type_mapping`: Per-family translation of oracle type labels
//! - `proxy`: Decorator that consults the oracle before the real adapter
//! - `registry`: Adapter factory and the registration interceptor

use crate::{Result, models::{Column, RelationKey}};
use async_trait::async_trait;

pub mod proxy;
pub mod registry;
pub mod type_mapping;


pub use proxy::OracleProxyResolver;
pub use registry::{
    AdapterConfig, AdapterConstructor, AdapterFactory, AdapterRegistry, Credentials,
    InterceptingFactory,
};
pub use type_mapping::{BigQueryTypes, SnowflakeTypes, TypeTranslator, translator_for};

/// Capability shared by every warehouse adapter: list a relation's columns.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Arc<dyn ColumnResolver>`. The proxy decorator wraps whichever variant
/// the host engine registered.
#[async_trait]
pub trait ColumnResolver: Send + Sync {
    /// Resolves the ordered column list of `relation`.
    ///
    /// # Errors
    /// Real adapters return [`crate::error::ColProxyError::RelationNotFound`]
    /// when the relation does not exist, and other variants for genuine
    /// failures
    async fn get_columns_in_relation(&self, relation: &RelationKey) -> Result<Vec<Column>>;

    /// Credential type this adapter was registered under (e.g. `bigquery`).
    fn credentials_type(&self) -> &str;

    /// Whether this resolver already routes through the oracle.
    fn is_intercepted(&self) -> bool {
        false
    }
}
