//! Repository for the `campaign_document` table.
//!
//! Writes go through [`DocumentRepo::save`], which appends a snapshot and
//! upserts the current row in one transaction.

use campfire_core::types::Timestamp;

use crate::models::document::{CampaignDocumentRow, StoredWrite};
use crate::DbPool;

/// Column list for `campaign_document` queries.
const COLUMNS: &str = "id, data, version, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    /// Load the current document, if one was ever written.
    pub async fn find_current(pool: &DbPool) -> Result<Option<CampaignDocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaign_document WHERE id = 1");
        sqlx::query_as::<_, CampaignDocumentRow>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Persist an accepted write: new snapshot plus current-row upsert.
    ///
    /// `data` must be the canonical serialization that `version` was
    /// computed from.
    pub async fn save(
        pool: &DbPool,
        data: &str,
        version: &str,
        at: Timestamp,
    ) -> Result<StoredWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let snapshot_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO campaign_snapshots (data, created_at) VALUES (?, ?) RETURNING id",
        )
        .bind(data)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO campaign_document (id, data, version, updated_at) \
             VALUES (1, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 data       = excluded.data, \
                 version    = excluded.version, \
                 updated_at = excluded.updated_at",
        )
        .bind(data)
        .bind(version)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StoredWrite {
            snapshot_id,
            updated_at: at,
        })
    }
}
