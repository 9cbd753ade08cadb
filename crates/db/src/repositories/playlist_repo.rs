//! Repository for the jukebox tables.
//!
//! The playlist is small, so a save rewrites every track row in order. That
//! keeps `position` dense in the store without diffing against the
//! previous state.

use campfire_core::playlist::PlaylistState;
use campfire_core::types::{DbId, Timestamp};

use crate::models::playlist::{PlaylistStateRow, TrackRow};
use crate::DbPool;

/// Column list for `playlist_tracks` queries.
const TRACK_COLUMNS: &str = "\
    id, source_id, url, title, badge, added_by, position, added_at";

pub struct PlaylistRepo;

impl PlaylistRepo {
    /// All tracks ordered by position.
    pub async fn list_tracks(pool: &DbPool) -> Result<Vec<TrackRow>, sqlx::Error> {
        let query = format!("SELECT {TRACK_COLUMNS} FROM playlist_tracks ORDER BY position ASC");
        sqlx::query_as::<_, TrackRow>(&query).fetch_all(pool).await
    }

    /// The transport row, if it was ever written.
    pub async fn find_state(pool: &DbPool) -> Result<Option<PlaylistStateRow>, sqlx::Error> {
        sqlx::query_as::<_, PlaylistStateRow>(
            "SELECT cursor, is_playing, volume, position_secs, updated_at \
             FROM playlist_state WHERE id = 1",
        )
        .fetch_optional(pool)
        .await
    }

    /// Persist the full state in one transaction.
    ///
    /// `snapshot` is the serialized state appended to `playlist_snapshots`.
    /// Returns the snapshot id.
    pub async fn save(
        pool: &DbPool,
        state: &PlaylistState,
        snapshot: &str,
        at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM playlist_tracks")
            .execute(&mut *tx)
            .await?;

        for track in state.tracks() {
            sqlx::query(
                "INSERT INTO playlist_tracks \
                     (id, source_id, url, title, badge, added_by, position, added_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(track.id)
            .bind(&track.source_id)
            .bind(&track.url)
            .bind(&track.title)
            .bind(&track.badge)
            .bind(&track.added_by)
            .bind(track.position as i64)
            .bind(track.added_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO playlist_state (id, cursor, is_playing, volume, position_secs, updated_at) \
             VALUES (1, ?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 cursor        = excluded.cursor, \
                 is_playing    = excluded.is_playing, \
                 volume        = excluded.volume, \
                 position_secs = excluded.position_secs, \
                 updated_at    = excluded.updated_at",
        )
        .bind(state.cursor())
        .bind(state.is_playing())
        .bind(i64::from(state.volume()))
        .bind(state.current_time())
        .bind(at)
        .execute(&mut *tx)
        .await?;

        let snapshot_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO playlist_snapshots (data, created_at) VALUES (?, ?) RETURNING id",
        )
        .bind(snapshot)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(snapshot_id)
    }

    /// Number of rows in the playlist snapshot log.
    pub async fn snapshot_count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_snapshots")
            .fetch_one(pool)
            .await
    }
}
