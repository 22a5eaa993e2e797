//! One-off oracle lookup for diagnosing what the engine will see.

use colproxy_core::{
    AdapterFamily, Column, HttpOracle, MetadataOracle, OracleConfig, RelationKey,
    ResolutionOutcome, Result, normalize, translator_for,
};
use serde::Serialize;

/// JSON report printed by `colproxy resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    /// Normalized relation that was sent to the oracle
    pub relation: String,
    /// Family whose type labels the columns use
    pub family: AdapterFamily,
    /// `resolved`, `not_found` or `deferred`
    pub outcome: &'static str,
    /// Translated columns; absent when the oracle deferred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
}

/// Asks the oracle about `relation` and translates any columns for `family`.
///
/// A deferred answer is reported as-is; there is no warehouse to fall
/// back to here.
///
/// # Errors
/// Returns error if the relation name is invalid or the oracle lookup fails
pub async fn resolve(
    config: OracleConfig,
    family: AdapterFamily,
    relation: &str,
) -> Result<ResolveReport> {
    let relation = RelationKey::parse_dotted(relation)?;
    let oracle = HttpOracle::new(config)?;
    let key = normalize(&relation);

    let outcome = oracle.lookup(&key).await?;
    let columns = match &outcome {
        ResolutionOutcome::Resolved(descriptors) => {
            let translator = translator_for(family);
            Some(
                descriptors
                    .iter()
                    .map(|d| Column::new(d.name.clone(), translator.translate(&d.raw_type)))
                    .collect(),
            )
        }
        ResolutionOutcome::Empty => Some(Vec::new()),
        ResolutionOutcome::Deferred => None,
    };

    Ok(ResolveReport {
        relation: key.to_string(),
        family,
        outcome: outcome.label(),
        columns,
    })
}
