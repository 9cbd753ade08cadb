//! Seed document for a store that has never been written.

use std::path::Path;

use serde_json::{Map, Value};

/// Read the bootstrap file at `path`.
///
/// A missing, unreadable or non-object file yields an empty object; the
/// first start must never fail because of a bad seed.
pub async fn read_seed(path: Option<&Path>) -> Value {
    let empty = Value::Object(Map::new());
    let Some(path) = path else {
        return empty;
    };

    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::info!(path = %path.display(), error = %e, "No bootstrap file, starting empty");
            return empty;
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(value) if value.is_object() => {
            tracing::info!(path = %path.display(), "Seeding document from bootstrap file");
            value
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Bootstrap file is not a JSON object, ignoring");
            empty
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Bootstrap file is not valid JSON, ignoring");
            empty
        }
    }
}
