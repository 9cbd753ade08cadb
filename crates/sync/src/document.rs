//! Owner of the shared campaign document.

use std::path::Path;
use std::sync::Arc;

use campfire_core::backup::CAMPAIGN_BACKUP_PREFIX;
use campfire_core::document::{admit, clamp_snapshot_limit, CanonicalDocument, WriteGuard};
use campfire_core::error::CoreError;
use campfire_core::types::{DbId, Timestamp};
use campfire_db::models::document::SnapshotSummary;
use campfire_db::repositories::{DocumentRepo, SnapshotRepo};
use campfire_db::DbPool;
use campfire_events::protocol::DocumentPayload;
use campfire_events::{CampaignEvent, EventBus};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::backup::BackupWriter;
use crate::bootstrap;
use crate::error::SyncError;

/// Read-only copy of the current document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub data: serde_json::Value,
    pub version: String,
    pub updated_at: Timestamp,
}

/// Outcome of an accepted write or restore.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteReceipt {
    pub version: String,
    pub snapshot_id: DbId,
    pub updated_at: Timestamp,
}

struct Current {
    doc: CanonicalDocument,
    updated_at: Timestamp,
}

pub struct DocumentSync {
    pool: DbPool,
    bus: Arc<EventBus>,
    backups: Option<BackupWriter>,
    size_limit: usize,
    current: Mutex<Current>,
}

impl DocumentSync {
    /// Load the persisted document, seeding it from `bootstrap` the first
    /// time the store is opened.
    pub async fn load(
        pool: DbPool,
        bus: Arc<EventBus>,
        backups: Option<BackupWriter>,
        bootstrap: Option<&Path>,
        size_limit: usize,
    ) -> Result<Self, SyncError> {
        let current = match DocumentRepo::find_current(&pool).await? {
            Some(row) => Current {
                doc: CanonicalDocument::from_stored(&row.data)?,
                updated_at: row.updated_at,
            },
            None => {
                let doc = CanonicalDocument::from_value(bootstrap::read_seed(bootstrap).await)?;
                let stored = DocumentRepo::save(&pool, &doc.raw, &doc.version, Utc::now()).await?;
                tracing::info!(
                    version = %doc.version,
                    snapshot_id = stored.snapshot_id,
                    "Initialized campaign document"
                );
                Current {
                    doc,
                    updated_at: stored.updated_at,
                }
            }
        };

        tracing::info!(
            version = %current.doc.version,
            size = current.doc.size(),
            "Campaign document loaded"
        );

        Ok(Self {
            pool,
            bus,
            backups,
            size_limit,
            current: Mutex::new(current),
        })
    }

    pub async fn get(&self) -> DocumentView {
        let current = self.current.lock().await;
        DocumentView {
            data: current.doc.data.clone(),
            version: current.doc.version.clone(),
            updated_at: current.updated_at,
        }
    }

    pub async fn version(&self) -> String {
        self.current.lock().await.doc.version.clone()
    }

    /// Guarded write from the request/response surface; every peer receives
    /// the new state.
    pub async fn put(
        &self,
        candidate: serde_json::Value,
        guard: WriteGuard<'_>,
    ) -> Result<WriteReceipt, SyncError> {
        self.write(None, candidate, guard).await
    }

    /// Guarded write submitted over a peer's live channel. The new state goes
    /// to every peer except `origin`, which already has it.
    pub async fn put_from(
        &self,
        origin: &str,
        candidate: serde_json::Value,
    ) -> Result<WriteReceipt, SyncError> {
        self.write(Some(origin), candidate, WriteGuard::default())
            .await
    }

    async fn write(
        &self,
        origin: Option<&str>,
        candidate: serde_json::Value,
        guard: WriteGuard<'_>,
    ) -> Result<WriteReceipt, SyncError> {
        let candidate = CanonicalDocument::from_value(candidate)?;

        let mut current = self.current.lock().await;
        if let Err(e) = admit(&candidate, &current.doc.version, &guard, self.size_limit) {
            tracing::info!(error = %e, origin, "Document write rejected");
            return Err(e.into());
        }
        self.commit(&mut current, candidate, origin).await
    }

    /// Newest-first snapshot metadata.
    pub async fn list_snapshots(&self, limit: Option<i64>) -> Result<Vec<SnapshotSummary>, SyncError> {
        let limit = clamp_snapshot_limit(limit);
        Ok(SnapshotRepo::list_recent(&self.pool, limit).await?)
    }

    /// Make snapshot `id` the current document again.
    ///
    /// Restoring is deliberate, so neither the empty-state guard nor the
    /// size ceiling applies. The snapshot text is stored again unchanged, so
    /// the version matches the one it had when it was first written.
    pub async fn restore(&self, id: DbId) -> Result<WriteReceipt, SyncError> {
        let snapshot = SnapshotRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "snapshot",
                id,
            })?;
        let candidate = CanonicalDocument::from_stored(&snapshot.data)?;

        let mut current = self.current.lock().await;
        let receipt = self.commit(&mut current, candidate, None).await?;
        tracing::info!(restored = id, version = %receipt.version, "Snapshot restored");
        Ok(receipt)
    }

    /// Queue the full document for a single peer.
    pub async fn sync_peer(&self, peer: &str) {
        let current = self.current.lock().await;
        self.bus
            .send_to(peer, CampaignEvent::State(payload(&current.doc)));
    }

    /// Persist, swap and publish. Runs with the document lock held.
    async fn commit(
        &self,
        current: &mut Current,
        candidate: CanonicalDocument,
        origin: Option<&str>,
    ) -> Result<WriteReceipt, SyncError> {
        let stored = DocumentRepo::save(&self.pool, &candidate.raw, &candidate.version, Utc::now())
            .await?;

        *current = Current {
            doc: candidate,
            updated_at: stored.updated_at,
        };

        let event = CampaignEvent::State(payload(&current.doc));
        match origin {
            Some(peer) => self.bus.broadcast_except(peer, event),
            None => self.bus.broadcast(event),
        }

        if let Some(backups) = &self.backups {
            backups.spawn_json(
                CAMPAIGN_BACKUP_PREFIX,
                current.doc.raw.clone(),
                stored.updated_at,
            );
        }

        tracing::debug!(
            version = %current.doc.version,
            snapshot_id = stored.snapshot_id,
            origin,
            "Document write accepted"
        );

        Ok(WriteReceipt {
            version: current.doc.version.clone(),
            snapshot_id: stored.snapshot_id,
            updated_at: stored.updated_at,
        })
    }
}

fn payload(doc: &CanonicalDocument) -> DocumentPayload {
    DocumentPayload {
        data: doc.data.clone(),
        version: doc.version.clone(),
    }
}
