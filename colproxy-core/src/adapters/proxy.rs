//! Oracle-first column resolution.
//!
//! `OracleProxyResolver` wraps the adapter the host engine registered and
//! answers `get_columns_in_relation` from the oracle whenever it can:
//! - `Resolved`: oracle columns, translated for the adapter family
//! - `Empty`: no columns, the real database is never touched
//! - `Deferred`: the captured origin adapter answers; its not-found
//!   condition becomes an empty list

use super::{ColumnResolver, TypeTranslator};
use crate::models::{Column, RelationKey, ResolutionOutcome};
use crate::oracle::MetadataOracle;
use crate::relation::normalize;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Decorator that consults the metadata oracle before the real adapter.
///
/// Each instance owns its captured origin; nothing is shared between
/// registrations.
pub struct OracleProxyResolver {
    origin: Arc<dyn ColumnResolver>,
    oracle: Arc<dyn MetadataOracle>,
    translator: Arc<dyn TypeTranslator>,
}

impl std::fmt::Debug for OracleProxyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleProxyResolver")
            .field("credentials_type", &self.origin.credentials_type())
            .field("family", &self.translator.family())
            .finish_non_exhaustive()
    }
}

impl OracleProxyResolver {
    /// Wraps `origin`, answering through `oracle` and `translator`.
    pub fn new(
        origin: Arc<dyn ColumnResolver>,
        oracle: Arc<dyn MetadataOracle>,
        translator: Arc<dyn TypeTranslator>,
    ) -> Self {
        Self {
            origin,
            oracle,
            translator,
        }
    }

    /// Delegates to the origin adapter, mapping "relation not found" to no columns.
    async fn resolve_from_origin(&self, relation: &RelationKey) -> Result<Vec<Column>> {
        match self.origin.get_columns_in_relation(relation).await {
            Err(e) if e.is_not_found() => {
                debug!(relation = %relation, "origin adapter reports relation absent");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

#[async_trait]
impl ColumnResolver for OracleProxyResolver {
    async fn get_columns_in_relation(&self, relation: &RelationKey) -> Result<Vec<Column>> {
        let key = normalize(relation);

        match self.oracle.lookup(&key).await? {
            ResolutionOutcome::Resolved(descriptors) => {
                debug!(relation = %key, columns = descriptors.len(), "resolved from oracle");
                Ok(descriptors
                    .into_iter()
                    .map(|d| Column::new(d.name, self.translator.translate(&d.raw_type)))
                    .collect())
            }
            ResolutionOutcome::Empty => {
                debug!(relation = %key, "oracle reports relation absent");
                Ok(Vec::new())
            }
            ResolutionOutcome::Deferred => {
                debug!(
                    relation = %key,
                    adapter = self.origin.credentials_type(),
                    "deferring to origin adapter"
                );
                self.resolve_from_origin(relation).await
            }
        }
    }

    fn credentials_type(&self) -> &str {
        self.origin.credentials_type()
    }

    fn is_intercepted(&self) -> bool {
        true
    }
}
