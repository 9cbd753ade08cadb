//! Admission rules for the shared campaign document.
//!
//! A candidate document is canonicalized once (compact `serde_json`
//! serialization); the canonical string is both what gets stored and what
//! the version token is derived from. Every check here is pure so the
//! synchronizer can run them before touching the store.

use serde_json::Value;

use crate::error::CoreError;
use crate::hashing::content_version;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default ceiling for the serialized size of a document (~2.5 MB).
pub const MAX_DOCUMENT_BYTES: usize = 2_500_000;

/// Default number of snapshots returned by a listing.
pub const DEFAULT_SNAPSHOT_LIMIT: i64 = 100;

/// Upper bound for a snapshot listing.
pub const MAX_SNAPSHOT_LIMIT: i64 = 500;

// ---------------------------------------------------------------------------
// Canonical form
// ---------------------------------------------------------------------------

/// A document in its canonical serialized form together with its version.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    pub data: Value,
    pub raw: String,
    pub version: String,
}

impl CanonicalDocument {
    /// Canonicalize a candidate submitted by a peer.
    ///
    /// Only JSON objects are accepted as documents.
    pub fn from_value(data: Value) -> Result<Self, CoreError> {
        if !data.is_object() {
            return Err(CoreError::Validation(
                "document body must be a JSON object".to_string(),
            ));
        }
        let raw = serde_json::to_string(&data)
            .map_err(|e| CoreError::Internal(format!("failed to serialize document: {e}")))?;
        let version = content_version(raw.as_bytes());
        Ok(Self { data, raw, version })
    }

    /// Rebuild a document from text previously written to the store.
    ///
    /// The stored text is kept byte for byte and the version is the hash of
    /// exactly those bytes; it is never re-serialized.
    pub fn from_stored(raw: &str) -> Result<Self, CoreError> {
        let data: Value = serde_json::from_str(raw)
            .map_err(|e| CoreError::Internal(format!("stored document is not valid JSON: {e}")))?;
        if !data.is_object() {
            return Err(CoreError::Internal(
                "stored document is not a JSON object".to_string(),
            ));
        }
        Ok(Self {
            data,
            raw: raw.to_string(),
            version: content_version(raw.as_bytes()),
        })
    }

    /// The empty object used when nothing has been persisted yet.
    pub fn empty() -> Self {
        let raw = "{}".to_string();
        let version = content_version(raw.as_bytes());
        Self {
            data: Value::Object(Default::default()),
            raw,
            version,
        }
    }

    /// Size in bytes of the canonical serialization.
    pub fn size(&self) -> usize {
        self.raw.len()
    }
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Options that accompany a write.
#[derive(Debug, Clone, Default)]
pub struct WriteGuard<'a> {
    /// Version the writer last observed; `None` skips the precondition.
    pub expected_version: Option<&'a str>,
    /// Explicit override for intentional resets.
    pub allow_empty: bool,
}

/// Reject candidates whose canonical form exceeds `limit` bytes.
pub fn check_size(candidate: &CanonicalDocument, limit: usize) -> Result<(), CoreError> {
    let size = candidate.size();
    if size > limit {
        return Err(CoreError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

/// Optimistic-concurrency precondition.
pub fn check_version(expected: Option<&str>, current: &str) -> Result<(), CoreError> {
    match expected.map(normalize_version_tag) {
        Some(expected) if expected != current => Err(CoreError::VersionConflict {
            expected: expected.to_string(),
            current: current.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Run every admission check in order: size, version, empty-state.
pub fn admit(
    candidate: &CanonicalDocument,
    current_version: &str,
    guard: &WriteGuard<'_>,
    size_limit: usize,
) -> Result<(), CoreError> {
    check_size(candidate, size_limit)?;
    check_version(guard.expected_version, current_version)?;
    if !guard.allow_empty && looks_empty(&candidate.data) {
        return Err(CoreError::EmptyStateRejected);
    }
    Ok(())
}

/// Heuristic for "this write would wipe the campaign".
///
/// A document counts as populated when any table has rows, either note
/// field has non-blank text, or any list has items.
pub fn looks_empty(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return true;
    };

    let has_rows = obj
        .get("tables")
        .and_then(Value::as_array)
        .is_some_and(|tables| tables.iter().any(|t| non_empty_array(t.get("rows"))));
    if has_rows {
        return false;
    }

    if non_blank_text(obj.get("notes")) || non_blank_text(obj.get("quickNotes")) {
        return false;
    }

    let has_items = obj
        .get("lists")
        .and_then(Value::as_array)
        .is_some_and(|lists| lists.iter().any(|l| non_empty_array(l.get("items"))));

    !has_items
}

fn non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|a| !a.is_empty())
}

fn non_blank_text(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(other) => !other.to_string().trim().is_empty(),
    }
}

/// Strip the weak prefix and quotes from an `ETag`/`If-Match` value.
pub fn normalize_version_tag(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    tag.trim_matches('"')
}

/// Clamp a requested snapshot listing size.
pub fn clamp_snapshot_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_SNAPSHOT_LIMIT)
        .clamp(1, MAX_SNAPSHOT_LIMIT)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> CanonicalDocument {
        CanonicalDocument::from_value(value).unwrap()
    }

    #[test]
    fn version_is_hash_of_canonical_bytes() {
        let d = doc(json!({"notes": "dragon", "tables": []}));
        assert_eq!(d.version, content_version(d.raw.as_bytes()));
        assert_eq!(d.raw, serde_json::to_string(&d.data).unwrap());
    }

    #[test]
    fn identical_content_yields_identical_version() {
        let a = doc(json!({"b": 1, "a": [1, 2]}));
        let b = doc(json!({"a": [1, 2], "b": 1}));
        assert_eq!(a.version, b.version);
    }

    #[test]
    fn stored_text_round_trips() {
        let d = doc(json!({"lists": [{"items": ["torch"]}]}));
        let back = CanonicalDocument::from_stored(&d.raw).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn stored_text_is_kept_verbatim() {
        let raw = r#"{"ac":1.0355302733065221,"hp":0.9739162912356397}"#;
        let d = CanonicalDocument::from_stored(raw).unwrap();
        assert_eq!(d.raw, raw);
        assert_eq!(d.version, content_version(raw.as_bytes()));

        // Content parsed from the store canonicalizes back to the same text.
        assert_eq!(doc(d.data.clone()).raw, raw);
    }

    #[test]
    fn stored_non_object_is_an_internal_error() {
        assert_matches!(
            CanonicalDocument::from_stored("[1,2]"),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn non_object_is_rejected() {
        assert_matches!(
            CanonicalDocument::from_value(json!([1, 2])),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            CanonicalDocument::from_value(json!("text")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_constant_matches_canonicalized_empty_object() {
        assert_eq!(CanonicalDocument::empty(), doc(json!({})));
    }

    #[test]
    fn oversized_candidate_is_rejected() {
        let d = doc(json!({"notes": "x".repeat(64)}));
        assert_matches!(
            check_size(&d, 10),
            Err(CoreError::PayloadTooLarge { limit: 10, .. })
        );
        assert!(check_size(&d, d.size()).is_ok());
    }

    #[test]
    fn stale_version_conflicts() {
        assert_matches!(
            check_version(Some("old"), "new"),
            Err(CoreError::VersionConflict { .. })
        );
        assert!(check_version(Some("same"), "same").is_ok());
        assert!(check_version(None, "anything").is_ok());
    }

    #[test]
    fn quoted_etag_matches_bare_version() {
        assert!(check_version(Some("\"abc\""), "abc").is_ok());
        assert!(check_version(Some("W/\"abc\""), "abc").is_ok());
    }

    #[test]
    fn looks_empty_detects_unpopulated_documents() {
        assert!(looks_empty(&json!({})));
        assert!(looks_empty(&json!({"tables": [{"rows": []}], "notes": "  "})));
        assert!(looks_empty(&json!({"lists": [{"items": []}], "quickNotes": null})));
        assert!(looks_empty(&json!(null)));
    }

    #[test]
    fn looks_empty_accepts_any_populated_section() {
        assert!(!looks_empty(&json!({"tables": [{"rows": []}, {"rows": [{"hp": 3}]}]})));
        assert!(!looks_empty(&json!({"notes": "session 4"})));
        assert!(!looks_empty(&json!({"quickNotes": "buy rope"})));
        assert!(!looks_empty(&json!({"lists": [{"items": ["rope"]}]})));
    }

    #[test]
    fn admit_respects_allow_empty_override() {
        let empty = doc(json!({"tables": []}));
        let strict = WriteGuard::default();
        assert_matches!(
            admit(&empty, &empty.version, &strict, MAX_DOCUMENT_BYTES),
            Err(CoreError::EmptyStateRejected)
        );

        let reset = WriteGuard {
            expected_version: None,
            allow_empty: true,
        };
        assert!(admit(&empty, &empty.version, &reset, MAX_DOCUMENT_BYTES).is_ok());
    }

    #[test]
    fn admit_checks_size_before_version() {
        let d = doc(json!({"notes": "x".repeat(32)}));
        let guard = WriteGuard {
            expected_version: Some("stale"),
            allow_empty: false,
        };
        assert_matches!(
            admit(&d, "current", &guard, 8),
            Err(CoreError::PayloadTooLarge { .. })
        );
        assert_matches!(
            admit(&d, "current", &guard, MAX_DOCUMENT_BYTES),
            Err(CoreError::VersionConflict { .. })
        );
    }

    #[test]
    fn snapshot_limit_is_clamped() {
        assert_eq!(clamp_snapshot_limit(None), DEFAULT_SNAPSHOT_LIMIT);
        assert_eq!(clamp_snapshot_limit(Some(0)), 1);
        assert_eq!(clamp_snapshot_limit(Some(10_000)), MAX_SNAPSHOT_LIMIT);
        assert_eq!(clamp_snapshot_limit(Some(25)), 25);
    }
}
