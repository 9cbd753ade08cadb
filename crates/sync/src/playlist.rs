//! Owner of the session's jukebox.
//!
//! Commands are applied to a copy of the state; only after the copy is
//! durably stored does it replace the in-memory state and go out to peers.

use std::sync::Arc;

use campfire_core::backup::JUKEBOX_BACKUP_PREFIX;
use campfire_core::playlist::{
    CommandContext, Cue, PlaylistCommand, PlaylistState, Track, DEFAULT_VOLUME, EMPTIED_NOTICE,
};
use campfire_db::repositories::PlaylistRepo;
use campfire_db::DbPool;
use campfire_events::{EventBus, JukeboxEvent};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::backup::BackupWriter;
use crate::error::SyncError;

pub struct PlaylistSync {
    pool: DbPool,
    bus: Arc<EventBus>,
    backups: Option<BackupWriter>,
    state: Mutex<PlaylistState>,
}

impl PlaylistSync {
    /// Load the persisted playlist, or defaults if it was never written.
    pub async fn load(
        pool: DbPool,
        bus: Arc<EventBus>,
        backups: Option<BackupWriter>,
    ) -> Result<Self, SyncError> {
        let tracks: Vec<Track> = PlaylistRepo::list_tracks(&pool)
            .await?
            .into_iter()
            .map(Track::from)
            .collect();

        let state = match PlaylistRepo::find_state(&pool).await? {
            Some(row) => PlaylistState::from_parts(
                tracks,
                row.cursor,
                row.is_playing,
                row.volume,
                row.position_secs,
            ),
            None => PlaylistState::from_parts(tracks, -1, false, i64::from(DEFAULT_VOLUME), 0.0),
        };

        tracing::info!(
            tracks = state.len(),
            cursor = state.cursor(),
            "Playlist loaded"
        );

        Ok(Self {
            pool,
            bus,
            backups,
            state: Mutex::new(state),
        })
    }

    pub async fn snapshot(&self) -> PlaylistState {
        self.state.lock().await.clone()
    }

    /// Queue the full state for a single peer.
    pub async fn sync_peer(&self, peer: &str) {
        let state = self.state.lock().await;
        self.bus.send_to(peer, JukeboxEvent::State(state.clone()));
    }

    /// Run one command.
    ///
    /// Returns `Ok(false)` when the command changed nothing; in that case
    /// nothing is stored or published. `origin` is the submitting peer.
    pub async fn apply(
        &self,
        command: PlaylistCommand,
        origin: Option<&str>,
    ) -> Result<bool, SyncError> {
        let name = command.name();
        let ctx = CommandContext {
            actor: origin.map(str::to_string),
            now: Utc::now(),
        };

        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let Some(cues) = next.apply(command, &ctx) else {
            tracing::debug!(command = name, origin, "Playlist command was a no-op");
            return Ok(false);
        };

        let snapshot = serde_json::to_string(&next)?;
        let snapshot_id = PlaylistRepo::save(&self.pool, &next, &snapshot, ctx.now).await?;
        *state = next;

        for cue in cues {
            self.publish_cue(cue, origin);
        }
        self.bus.broadcast(JukeboxEvent::State(state.clone()));

        if let Some(backups) = &self.backups {
            backups.spawn_json(JUKEBOX_BACKUP_PREFIX, snapshot, ctx.now);
        }

        tracing::debug!(
            command = name,
            origin,
            snapshot_id,
            tracks = state.len(),
            cursor = state.cursor(),
            "Playlist command applied"
        );
        Ok(true)
    }

    fn publish_cue(&self, cue: Cue, origin: Option<&str>) {
        match cue {
            Cue::Jump { index, seek } => self.bus.broadcast(JukeboxEvent::PlayIndex { index, seek }),
            Cue::Paused => self.bus.broadcast(JukeboxEvent::Paused),
            Cue::Resumed => self.bus.broadcast(JukeboxEvent::Resumed),
            Cue::Volume(volume) => self.bus.broadcast(JukeboxEvent::Volume { volume }),
            Cue::Seek(seconds) => {
                let event = JukeboxEvent::Seek { seconds };
                match origin {
                    Some(peer) => self.bus.broadcast_except(peer, event),
                    None => self.bus.broadcast(event),
                }
            }
            Cue::Emptied => self.bus.broadcast(JukeboxEvent::Toast {
                message: EMPTIED_NOTICE.to_string(),
            }),
        }
    }
}
