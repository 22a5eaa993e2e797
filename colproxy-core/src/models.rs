//! Core data models for relation lookups and column metadata.
//!
//! These are the types that flow between the host engine, the proxy
//! resolver, and the metadata oracle.

use serde::{Deserialize, Serialize};

/// Reference to a table or view, as the host engine supplies it.
///
/// Every component is optional. Identity is the ordered triple with case
/// preserved exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationKey {
    /// Database (BigQuery project)
    pub database: Option<String>,
    /// Schema (BigQuery dataset)
    pub schema: Option<String>,
    /// Table or view name
    pub identifier: Option<String>,
}

impl RelationKey {
    /// Creates a fully qualified relation key.
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            database: Some(database.into()),
            schema: Some(schema.into()),
            identifier: Some(identifier.into()),
        }
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Builder method to set schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method to set identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Parses `table`, `schema.table`, or `db.schema.table`.
    ///
    /// Parts are right-aligned, so a two-part name fills schema and
    /// identifier and leaves the database absent.
    ///
    /// # Errors
    /// Returns a configuration error for empty input, empty parts, or more
    /// than three parts.
    pub fn parse_dotted(input: &str) -> crate::Result<Self> {
        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(crate::error::ColProxyError::configuration(format!(
                "invalid relation name '{}'",
                input
            )));
        }

        let owned = |part: &&str| Some((*part).to_string());
        match parts.as_slice() {
            [table] => Ok(Self {
                identifier: owned(table),
                ..Self::default()
            }),
            [schema, table] => Ok(Self {
                database: None,
                schema: owned(schema),
                identifier: owned(table),
            }),
            [db, schema, table] => Ok(Self {
                database: owned(db),
                schema: owned(schema),
                identifier: owned(table),
            }),
            _ => Err(crate::error::ColProxyError::configuration(format!(
                "relation name '{}' has more than three parts",
                input
            ))),
        }
    }
}

impl std::fmt::Display for RelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| crate::relation::NONE_SENTINEL.to_string())
        };
        write!(
            f,
            "{}.{}.{}",
            part(&self.database),
            part(&self.schema),
            part(&self.identifier)
        )
    }
}

/// One column as reported by the oracle: `[name, raw_type]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Type label exactly as the oracle sent it
    pub raw_type: String,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
        }
    }
}

impl From<(String, String)> for ColumnDescriptor {
    fn from((name, raw_type): (String, String)) -> Self {
        Self { name, raw_type }
    }
}

impl From<ColumnDescriptor> for (String, String) {
    fn from(descriptor: ColumnDescriptor) -> Self {
        (descriptor.name, descriptor.raw_type)
    }
}

/// Adapter-native column handed back to the host engine.
///
/// `data_type` has already been through the adapter family's type
/// translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Translated type label
    pub data_type: String,
}

impl Column {
    /// Creates a column with an already-translated type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// What the oracle said about a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// No cached answer; the real adapter must be consulted
    Deferred,
    /// The relation is known not to exist
    Empty,
    /// Authoritative column list, in oracle order
    Resolved(Vec<ColumnDescriptor>),
}

impl ResolutionOutcome {
    /// Short label used in logs and diagnostic output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Deferred => "deferred",
            Self::Empty => "not_found",
            Self::Resolved(_) => "resolved",
        }
    }
}

/// Warehouse families whose adapters can be intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterFamily {
    BigQuery,
    Snowflake,
}

impl AdapterFamily {
    /// Every family the interceptor knows how to wrap.
    pub const ALL: [Self; 2] = [Self::BigQuery, Self::Snowflake];

    /// Maps a host-engine credential type onto a family.
    ///
    /// Returns `None` for unsupported types; that is not an error.
    pub fn from_credentials_type(credentials_type: &str) -> Option<Self> {
        match credentials_type.trim().to_lowercase().as_str() {
            "bigquery" => Some(Self::BigQuery),
            "snowflake" => Some(Self::Snowflake),
            _ => None,
        }
    }

    /// Canonical credential type string.
    pub const fn credentials_type(self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::Snowflake => "snowflake",
        }
    }
}

impl std::fmt::Display for AdapterFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.credentials_type())
    }
}

impl std::str::FromStr for AdapterFamily {
    type Err = crate::error::ColProxyError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_credentials_type(s).ok_or_else(|| {
            crate::error::ColProxyError::configuration(format!(
                "unsupported adapter family '{}'",
                s
            ))
        })
    }
}
