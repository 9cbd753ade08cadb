//! Rows of the `campaign_document` and `campaign_snapshots` tables.

use campfire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// The current document row (always `id = 1`).
#[derive(Debug, Clone, FromRow)]
pub struct CampaignDocumentRow {
    pub id: DbId,
    /// Canonical serialized JSON, exactly as hashed into `version`.
    pub data: String,
    pub version: String,
    pub updated_at: Timestamp,
}

/// A full snapshot row, including its stored content.
#[derive(Debug, Clone, FromRow)]
pub struct CampaignSnapshot {
    pub id: DbId,
    pub data: String,
    pub created_at: Timestamp,
}

/// Snapshot metadata returned by listings.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct SnapshotSummary {
    pub id: DbId,
    pub created_at: Timestamp,
    /// Byte length of the stored content.
    pub size: i64,
}

/// Receipt for one committed write.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoredWrite {
    pub snapshot_id: DbId,
    pub updated_at: Timestamp,
}
