//! Rows of the `playlist_tracks` and `playlist_state` tables.

use campfire_core::playlist::Track;
use campfire_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `playlist_tracks` table.
#[derive(Debug, Clone, FromRow)]
pub struct TrackRow {
    pub id: Uuid,
    pub source_id: String,
    pub url: String,
    pub title: String,
    pub badge: Option<String>,
    pub added_by: Option<String>,
    pub position: i64,
    pub added_at: Timestamp,
}

impl From<TrackRow> for Track {
    fn from(row: TrackRow) -> Self {
        Track {
            id: row.id,
            source_id: row.source_id,
            url: row.url,
            title: row.title,
            badge: row.badge,
            added_by: row.added_by,
            position: usize::try_from(row.position).unwrap_or(usize::MAX),
            added_at: row.added_at,
        }
    }
}

/// The singleton `playlist_state` row.
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistStateRow {
    /// `-1` when no track is active.
    pub cursor: i64,
    pub is_playing: bool,
    pub volume: i64,
    pub position_secs: f64,
    pub updated_at: Timestamp,
}
