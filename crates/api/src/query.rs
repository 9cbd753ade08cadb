//! Query parameter types for the document endpoints.

use serde::Deserialize;

/// `GET /campaign?version=` (alternative to `If-None-Match`).
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    pub version: Option<String>,
}

/// `PUT /campaign?expected_version=&allow_empty=`.
///
/// `allowEmpty` is accepted as well for older clients.
#[derive(Debug, Default, Deserialize)]
pub struct WriteParams {
    pub expected_version: Option<String>,
    pub allow_empty: Option<String>,
    #[serde(rename = "allowEmpty")]
    pub allow_empty_legacy: Option<String>,
}

impl WriteParams {
    pub fn allow_empty(&self) -> bool {
        [&self.allow_empty, &self.allow_empty_legacy]
            .into_iter()
            .flatten()
            .any(|v| is_truthy(v))
    }
}

/// `GET /campaign/snapshots?limit=`. Clamped by the document owner.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotListParams {
    pub limit: Option<i64>,
}

/// Flag values understood in query strings and headers.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_empty_accepts_both_spellings() {
        let snake = WriteParams {
            allow_empty: Some("1".into()),
            ..Default::default()
        };
        let camel = WriteParams {
            allow_empty_legacy: Some("true".into()),
            ..Default::default()
        };
        let off = WriteParams {
            allow_empty: Some("0".into()),
            ..Default::default()
        };

        assert!(snake.allow_empty());
        assert!(camel.allow_empty());
        assert!(!off.allow_empty());
        assert!(!WriteParams::default().allow_empty());
    }
}
