//! Classification of oracle response bodies.
//!
//! Three body shapes are accepted:
//! - the legacy reserved tokens (`SOURCE`, `NOT_FOUND`, `NOT FOUND!`)
//! - a tagged object `{"status": ..., "columns": [...]}`
//! - a bare JSON array of `[name, raw_type]` pairs
//!
//! Anything else is rejected as malformed instead of being guessed at.

use crate::error::ColProxyError;
use crate::models::{ColumnDescriptor, ResolutionOutcome};
use crate::Result;
use serde::Deserialize;

/// Legacy token: the oracle has no answer, ask the real adapter.
pub const DEFER_TOKEN: &str = "SOURCE";

/// Legacy tokens: the relation is known not to exist.
pub const NOT_FOUND_TOKENS: [&str; 2] = ["NOT_FOUND", "NOT FOUND!"];

/// Tagged response body.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum TaggedResponse {
    Deferred,
    NotFound,
    Resolved { columns: Vec<ColumnDescriptor> },
}

impl From<TaggedResponse> for ResolutionOutcome {
    fn from(response: TaggedResponse) -> Self {
        match response {
            TaggedResponse::Deferred => Self::Deferred,
            TaggedResponse::NotFound => Self::Empty,
            TaggedResponse::Resolved { columns } => Self::Resolved(columns),
        }
    }
}

/// Classifies an oracle body into a [`ResolutionOutcome`].
///
/// `relation` is only used for error context.
///
/// # Errors
/// Returns [`ColProxyError::MalformedResponse`] when the body matches none
/// of the accepted shapes.
///
/// # Example
/// ```rust
/// use colproxy_core::models::ResolutionOutcome;
/// use colproxy_core::oracle::classify;
///
/// assert_eq!(classify("SOURCE", "a.b.c").unwrap(), ResolutionOutcome::Deferred);
/// assert_eq!(classify("NOT_FOUND", "a.b.c").unwrap(), ResolutionOutcome::Empty);
/// assert!(matches!(
///     classify(r#"[["id","INT64"]]"#, "a.b.c").unwrap(),
///     ResolutionOutcome::Resolved(columns) if columns.len() == 1
/// ));
/// ```
pub fn classify(body: &str, relation: &str) -> Result<ResolutionOutcome> {
    let trimmed = body.trim_end();

    if trimmed == DEFER_TOKEN {
        return Ok(ResolutionOutcome::Deferred);
    }
    if NOT_FOUND_TOKENS.contains(&trimmed) {
        return Ok(ResolutionOutcome::Empty);
    }

    match trimmed.trim_start().as_bytes().first() {
        Some(b'[') => serde_json::from_str::<Vec<ColumnDescriptor>>(trimmed)
            .map(ResolutionOutcome::Resolved)
            .map_err(|_| ColProxyError::malformed(relation, body)),
        Some(b'{') => serde_json::from_str::<TaggedResponse>(trimmed)
            .map(ResolutionOutcome::from)
            .map_err(|_| ColProxyError::malformed(relation, body)),
        _ => Err(ColProxyError::malformed(relation, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELATION: &str = "proj.analytics.users";

    #[test]
    fn test_legacy_defer_token() {
        assert_eq!(classify("SOURCE", RELATION).unwrap(), ResolutionOutcome::Deferred);
        assert_eq!(classify("SOURCE\n", RELATION).unwrap(), ResolutionOutcome::Deferred);
    }

    #[test]
    fn test_legacy_not_found_tokens() {
        assert_eq!(classify("NOT_FOUND", RELATION).unwrap(), ResolutionOutcome::Empty);
        assert_eq!(classify("NOT FOUND!", RELATION).unwrap(), ResolutionOutcome::Empty);
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        assert!(classify("source", RELATION).is_err());
        assert!(classify("not_found", RELATION).is_err());
    }

    #[test]
    fn test_bare_array_preserves_order() {
        let outcome = classify(r#"[["id","INT64"],["name","STRING"],["at","TIMESTAMP"]]"#, RELATION)
            .unwrap();
        let ResolutionOutcome::Resolved(columns) = outcome else {
            panic!("expected resolved outcome");
        };
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "at"]);
        assert_eq!(columns[0].raw_type, "INT64");
    }

    #[test]
    fn test_empty_array_is_resolved_not_empty() {
        assert_eq!(
            classify("[]", RELATION).unwrap(),
            ResolutionOutcome::Resolved(Vec::new())
        );
    }

    #[test]
    fn test_tagged_responses() {
        assert_eq!(
            classify(r#"{"status":"deferred"}"#, RELATION).unwrap(),
            ResolutionOutcome::Deferred
        );
        assert_eq!(
            classify(r#"{"status":"not_found"}"#, RELATION).unwrap(),
            ResolutionOutcome::Empty
        );
        assert_eq!(
            classify(
                r#"{"status":"resolved","columns":[["id","INT64"]]}"#,
                RELATION
            )
            .unwrap(),
            ResolutionOutcome::Resolved(vec![ColumnDescriptor::new("id", "INT64")])
        );
    }

    #[test]
    fn test_identifier_named_like_token_inside_json_is_data() {
        let outcome = classify(r#"[["SOURCE","STRING"]]"#, RELATION).unwrap();
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved(vec![ColumnDescriptor::new("SOURCE", "STRING")])
        );
    }

    #[test]
    fn test_malformed_bodies_fail_fast() {
        for body in [
            "",
            "<html>oops</html>",
            "[[\"id\"]]",
            "[[\"id\", 1]]",
            "{\"status\":\"maybe\"}",
            "{\"status\":\"resolved\"}",
            "[[\"id\",\"INT64\"]",
        ] {
            let error = classify(body, RELATION).unwrap_err();
            assert!(
                matches!(error, ColProxyError::MalformedResponse { .. }),
                "body {:?} should be malformed, got {}",
                body,
                error
            );
        }
    }
}
