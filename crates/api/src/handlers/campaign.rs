//! Handlers for the `/campaign` resource.
//!
//! The document's version token doubles as its `ETag`, so plain HTTP
//! conditional requests work: `If-None-Match` for cheap polling and
//! `If-Match` as the optimistic-concurrency precondition on writes.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campfire_core::document::{normalize_version_tag, WriteGuard};
use campfire_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::{is_truthy, ReadParams, SnapshotListParams, WriteParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header that opts a write out of the empty-state guard.
const ALLOW_EMPTY_HEADER: &str = "x-allow-empty";

/// Body of a successful restore.
#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub version: String,
    pub snapshot_id: DbId,
    pub restored: DbId,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// GET /api/v1/campaign
///
/// Returns `{data, version, updated_at}`, or 304 when the caller already has
/// the current version.
pub async fn get_campaign(
    State(state): State<AppState>,
    Query(params): Query<ReadParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let view = state.documents.get().await;

    let tag = etag(&view.version)?;

    let known =
        header_str(&headers, header::IF_NONE_MATCH.as_str())?.or(params.version.as_deref());
    if known.is_some_and(|tags| matches_any(tags, &view.version)) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, tag)]).into_response());
    }

    Ok(([(header::ETAG, tag)], Json(view)).into_response())
}

/// PUT /api/v1/campaign
///
/// The body is the candidate document. Precondition via `If-Match` or
/// `?expected_version=`; empty-state override via `?allow_empty=1`,
/// `?allowEmpty=1` or `x-allow-empty: 1`.
pub async fn put_campaign(
    State(state): State<AppState>,
    Query(params): Query<WriteParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let candidate: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Body is not valid JSON: {e}")))?;

    let if_match =
        header_str(&headers, header::IF_MATCH.as_str())?.filter(|v| v.trim() != "*");
    let expected_version = if_match.or(params.expected_version.as_deref());

    let allow_empty = params.allow_empty()
        || header_str(&headers, ALLOW_EMPTY_HEADER)?.is_some_and(is_truthy);

    let receipt = state
        .documents
        .put(
            candidate,
            WriteGuard {
                expected_version,
                allow_empty,
            },
        )
        .await?;

    let tag = etag(&receipt.version)?;
    Ok(([(header::ETAG, tag)], Json(DataResponse { data: receipt })).into_response())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /api/v1/campaign/snapshots?limit=
pub async fn list_snapshots(
    State(state): State<AppState>,
    Query(params): Query<SnapshotListParams>,
) -> AppResult<impl IntoResponse> {
    let snapshots = state.documents.list_snapshots(params.limit).await?;
    Ok(Json(DataResponse { data: snapshots }))
}

/// POST /api/v1/campaign/restore/{id}
pub async fn restore_snapshot(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let receipt = state.documents.restore(id).await?;
    Ok(Json(DataResponse {
        data: RestoreResponse {
            version: receipt.version,
            snapshot_id: receipt.snapshot_id,
            restored: id,
            updated_at: receipt.updated_at,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::BadRequest(format!("Invalid {name} header")))
        })
        .transpose()
}

fn etag(version: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!("\"{version}\""))
        .map_err(|e| AppError::InternalError(format!("Invalid ETag value: {e}")))
}

/// `If-None-Match` may carry a comma-separated list or `*`.
fn matches_any(tags: &str, version: &str) -> bool {
    tags.split(',').any(|tag| {
        let tag = tag.trim();
        tag == "*" || normalize_version_tag(tag) == version
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_none_match_lists_and_wildcards() {
        assert!(matches_any("\"abc\"", "abc"));
        assert!(matches_any("W/\"old\", \"abc\"", "abc"));
        assert!(matches_any("*", "abc"));
        assert!(!matches_any("\"old\"", "abc"));
    }
}
