//! Relation-key normalization for oracle requests.
//!
//! Absent components become the literal `None` so the oracle can match on
//! a fixed three-field key. Present components are sent verbatim apart
//! from percent-encoding, which the oracle's query parser undoes.

use crate::models::RelationKey;
use url::Url;

/// Wire token standing in for an absent relation component.
pub const NONE_SENTINEL: &str = "None";

/// Operation name sent in the `name` query parameter.
pub const GET_COLUMNS_OPERATION: &str = "get_columns_in_relation";

/// Canonical three-field key, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey {
    /// Database, or the `None` sentinel
    pub db: String,
    /// Schema, or the `None` sentinel
    pub schema: String,
    /// Table, or the `None` sentinel
    pub table: String,
}

/// Normalizes a relation key, substituting [`NONE_SENTINEL`] for absent parts.
///
/// # Example
/// ```rust
/// use colproxy_core::models::RelationKey;
/// use colproxy_core::relation::normalize;
///
/// let key = normalize(&RelationKey::default().with_identifier("users"));
/// assert_eq!(key.db, "None");
/// assert_eq!(key.schema, "None");
/// assert_eq!(key.table, "users");
/// ```
pub fn normalize(relation: &RelationKey) -> NormalizedKey {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .unwrap_or(NONE_SENTINEL)
            .to_string()
    };
    NormalizedKey {
        db: field(&relation.database),
        schema: field(&relation.schema),
        table: field(&relation.identifier),
    }
}

impl NormalizedKey {
    /// Appends the lookup query (`name`, `db`, `schema`, `table`) to `url`.
    ///
    /// Values are form-encoded, so identifiers containing `&`, `=`, `#` or
    /// spaces cannot corrupt the query string.
    pub fn append_query(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("name", GET_COLUMNS_OPERATION)
            .append_pair("db", &self.db)
            .append_pair("schema", &self.schema)
            .append_pair("table", &self.table);
    }
}

impl std::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.db, self.schema, self.table)
    }
}

impl From<&RelationKey> for NormalizedKey {
    fn from(relation: &RelationKey) -> Self {
        normalize(relation)
    }
}
