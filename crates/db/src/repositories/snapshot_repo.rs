//! Read access to the append-only `campaign_snapshots` log.
//!
//! Rows are only ever inserted by [`DocumentRepo::save`](super::DocumentRepo::save).

use campfire_core::types::DbId;

use crate::models::document::{CampaignSnapshot, SnapshotSummary};
use crate::DbPool;

pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Newest-first snapshot metadata, at most `limit` rows.
    pub async fn list_recent(pool: &DbPool, limit: i64) -> Result<Vec<SnapshotSummary>, sqlx::Error> {
        sqlx::query_as::<_, SnapshotSummary>(
            "SELECT id, created_at, length(CAST(data AS BLOB)) AS size \
             FROM campaign_snapshots ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Find a snapshot by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<CampaignSnapshot>, sqlx::Error> {
        sqlx::query_as::<_, CampaignSnapshot>(
            "SELECT id, data, created_at FROM campaign_snapshots WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Total number of snapshots.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM campaign_snapshots")
            .fetch_one(pool)
            .await
    }
}
