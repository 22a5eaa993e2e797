//! Oracle type labels to adapter-native column types.
//!
//! The oracle reports types using generic labels (`STRING`, `INTEGER`, ...)
//! or already-native names (`INT64`). Each warehouse family rewrites the
//! generic labels it knows and passes every other type through unchanged,
//! matching how the host engine's own column classes translate types.

use crate::models::AdapterFamily;
use std::sync::Arc;

/// Translates an oracle type label into an adapter-native type string.
pub trait TypeTranslator: Send + Sync {
    /// Family this translator belongs to.
    fn family(&self) -> AdapterFamily;

    /// Translates one raw type. Unknown types come back verbatim.
    fn translate(&self, raw_type: &str) -> String;
}

/// Looks up a label case-insensitively in `labels`, falling back to `raw_type`.
fn translate_with(labels: &[(&str, &str)], raw_type: &str) -> String {
    let upper = raw_type.trim().to_uppercase();
    labels
        .iter()
        .find(|(label, _)| *label == upper)
        .map_or_else(|| raw_type.to_string(), |(_, native)| (*native).to_string())
}

/// BigQuery (standard SQL) type translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigQueryTypes;

impl BigQueryTypes {
    const LABELS: [(&'static str, &'static str); 5] = [
        ("STRING", "STRING"),
        ("TIMESTAMP", "TIMESTAMP"),
        ("FLOAT", "FLOAT64"),
        ("INTEGER", "INT64"),
        ("RECORD", "STRUCT"),
    ];
}

impl TypeTranslator for BigQueryTypes {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::BigQuery
    }

    fn translate(&self, raw_type: &str) -> String {
        translate_with(&Self::LABELS, raw_type)
    }
}

/// Snowflake type translation (generic column labels).
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeTypes;

impl SnowflakeTypes {
    const LABELS: [(&'static str, &'static str); 4] = [
        ("STRING", "TEXT"),
        ("TIMESTAMP", "TIMESTAMP"),
        ("FLOAT", "FLOAT"),
        ("INTEGER", "INT"),
    ];
}

impl TypeTranslator for SnowflakeTypes {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Snowflake
    }

    fn translate(&self, raw_type: &str) -> String {
        translate_with(&Self::LABELS, raw_type)
    }
}

/// Returns the translator registered for `family`.
///
/// # Example
/// ```rust
/// use colproxy_core::adapters::translator_for;
/// use colproxy_core::models::AdapterFamily;
///
/// let bigquery = translator_for(AdapterFamily::BigQuery);
/// assert_eq!(bigquery.translate("INTEGER"), "INT64");
/// assert_eq!(bigquery.translate("INT64"), "INT64");
/// ```
pub fn translator_for(family: AdapterFamily) -> Arc<dyn TypeTranslator> {
    match family {
        AdapterFamily::BigQuery => Arc::new(BigQueryTypes),
        AdapterFamily::Snowflake => Arc::new(SnowflakeTypes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigquery_labels() {
        let t = BigQueryTypes;
        assert_eq!(t.translate("STRING"), "STRING");
        assert_eq!(t.translate("FLOAT"), "FLOAT64");
        assert_eq!(t.translate("INTEGER"), "INT64");
        assert_eq!(t.translate("RECORD"), "STRUCT");
        assert_eq!(t.translate("integer"), "INT64");
    }

    #[test]
    fn test_bigquery_native_types_pass_through() {
        let t = BigQueryTypes;
        assert_eq!(t.translate("INT64"), "INT64");
        assert_eq!(t.translate("NUMERIC"), "NUMERIC");
        assert_eq!(t.translate("ARRAY<STRING>"), "ARRAY<STRING>");
        assert_eq!(t.translate("geography"), "geography");
    }

    #[test]
    fn test_snowflake_labels() {
        let t = SnowflakeTypes;
        assert_eq!(t.translate("STRING"), "TEXT");
        assert_eq!(t.translate("INTEGER"), "INT");
        assert_eq!(t.translate("FLOAT"), "FLOAT");
        assert_eq!(t.translate("VARIANT"), "VARIANT");
    }

    #[test]
    fn test_translator_for_matches_family() {
        for family in AdapterFamily::ALL {
            assert_eq!(translator_for(family).family(), family);
        }
    }
}
