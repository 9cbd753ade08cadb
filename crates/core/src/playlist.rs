//! Playlist state machine for the shared jukebox.
//!
//! [`PlaylistState`] is only mutated through [`PlaylistState::apply`]; each
//! accepted [`PlaylistCommand`] returns the [`Cue`]s that must be emitted
//! ahead of the full-state broadcast. Malformed indices are clamped rather
//! than rejected, and structural commands on an empty playlist are no-ops.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PeerId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Volume of a freshly initialized session.
pub const DEFAULT_VOLUME: u8 = 70;

/// Maximum volume.
pub const MAX_VOLUME: u8 = 100;

/// Upper bound for seek positions (six hours).
pub const MAX_SEEK_SECS: f64 = 21_600.0;

/// Notice sent to every peer when the last track is removed.
pub const EMPTIED_NOTICE: &str = "Playlist is empty.";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One playable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Durable identity, stable across reorders.
    pub id: Uuid,
    /// External media identifier (e.g. a video id).
    #[serde(alias = "videoId")]
    pub source_id: String,
    pub url: String,
    /// Empty until resolved by a client.
    pub title: String,
    pub badge: Option<String>,
    pub added_by: Option<PeerId>,
    /// Dense zero-based rank, always equal to the index in the playlist.
    pub position: usize,
    pub added_at: Timestamp,
}

/// A track submitted by a peer, before it gets an identity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrack {
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "videoId")]
    pub source_id: String,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Control commands accepted by the playlist.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistCommand {
    AddTrack(NewTrack),
    RemoveAt(i64),
    Move { from: i64, to: i64 },
    PlayAt { index: i64, seek: f64 },
    SkipNext,
    SkipPrev,
    Pause,
    Resume,
    SetVolume(f64),
    SeekTo(f64),
}

impl PlaylistCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTrack(_) => "add_track",
            Self::RemoveAt(_) => "remove_index",
            Self::Move { .. } => "reorder",
            Self::PlayAt { .. } => "play_index",
            Self::SkipNext => "skip_next",
            Self::SkipPrev => "skip_prev",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetVolume(_) => "set_volume",
            Self::SeekTo(_) => "seek_to",
        }
    }
}

/// Who issued a command and when.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub actor: Option<PeerId>,
    pub now: Timestamp,
}

/// Side-channel signal produced by an accepted command.
///
/// Cues are emitted in order, before the authoritative full state.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Targeted jump: players should load `index` and seek to `seek`.
    Jump { index: usize, seek: f64 },
    Paused,
    Resumed,
    Volume(u8),
    Seek(f64),
    /// The last track was removed.
    Emptied,
}

/// Transport state of the session's jukebox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistState {
    playlist: Vec<Track>,
    #[serde(with = "cursor_repr")]
    current_index: Option<usize>,
    is_playing: bool,
    volume: u8,
    current_time: f64,
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            current_index: None,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            current_time: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

impl PlaylistState {
    /// Rebuild a state from persisted parts, repairing any invariant the
    /// stored data violates.
    pub fn from_parts(
        mut tracks: Vec<Track>,
        cursor: i64,
        is_playing: bool,
        volume: i64,
        current_time: f64,
    ) -> Self {
        tracks.sort_by_key(|t| t.position);
        let mut state = Self {
            playlist: tracks,
            current_index: usize::try_from(cursor).ok(),
            is_playing,
            volume: volume.clamp(0, i64::from(MAX_VOLUME)) as u8,
            current_time: clamp_seek(current_time),
        };
        state.reindex();
        if state.current_index.is_some_and(|i| i >= state.playlist.len()) {
            state.current_index = state.playlist.len().checked_sub(1);
        }
        if state.playlist.is_empty() {
            state.is_playing = false;
        }
        state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.playlist
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// The cursor in its wire/store form (`-1` for none).
    pub fn cursor(&self) -> i64 {
        self.current_index.map_or(-1, |i| i as i64)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Apply a command.
    ///
    /// Returns `None` when the command is a no-op (nothing changed, nothing
    /// to persist or emit), otherwise the cues to emit before the full state.
    pub fn apply(&mut self, command: PlaylistCommand, ctx: &CommandContext) -> Option<Vec<Cue>> {
        match command {
            PlaylistCommand::AddTrack(track) => self.add_track(track, ctx),
            PlaylistCommand::RemoveAt(index) => self.remove_at(index),
            PlaylistCommand::Move { from, to } => self.move_track(from, to),
            PlaylistCommand::PlayAt { index, seek } => {
                let index = clamp_index(index, self.len())?;
                Some(vec![self.jump_to(index, clamp_seek(seek))])
            }
            PlaylistCommand::SkipNext => {
                let len = self.len();
                if len == 0 {
                    return None;
                }
                let next = match self.current_index {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                };
                Some(vec![self.jump_to(next, 0.0)])
            }
            PlaylistCommand::SkipPrev => {
                let len = self.len();
                if len == 0 {
                    return None;
                }
                let prev = match self.current_index {
                    Some(i) if i > 0 && i < len => i - 1,
                    _ => len - 1,
                };
                Some(vec![self.jump_to(prev, 0.0)])
            }
            PlaylistCommand::Pause => {
                if self.is_empty() {
                    return None;
                }
                self.is_playing = false;
                Some(vec![Cue::Paused])
            }
            PlaylistCommand::Resume => {
                if self.is_empty() {
                    return None;
                }
                self.is_playing = true;
                Some(vec![Cue::Resumed])
            }
            PlaylistCommand::SetVolume(volume) => {
                if volume.is_finite() {
                    self.volume = volume.round().clamp(0.0, f64::from(MAX_VOLUME)) as u8;
                }
                Some(vec![Cue::Volume(self.volume)])
            }
            PlaylistCommand::SeekTo(seconds) => {
                self.current_time = clamp_seek(seconds);
                Some(vec![Cue::Seek(self.current_time)])
            }
        }
    }

    fn add_track(&mut self, track: NewTrack, ctx: &CommandContext) -> Option<Vec<Cue>> {
        let source_id = track.source_id.trim();
        if source_id.is_empty() {
            return None;
        }
        self.playlist.push(Track {
            id: Uuid::now_v7(),
            source_id: source_id.to_string(),
            url: track.url,
            title: track.title.unwrap_or_default(),
            badge: track.badge.filter(|b| !b.trim().is_empty()),
            added_by: ctx.actor.clone(),
            position: self.playlist.len(),
            added_at: ctx.now,
        });
        Some(Vec::new())
    }

    fn remove_at(&mut self, index: i64) -> Option<Vec<Cue>> {
        let index = clamp_index(index, self.len())?;
        self.playlist.remove(index);
        self.reindex();

        if self.playlist.is_empty() {
            self.current_index = None;
            self.is_playing = false;
            self.current_time = 0.0;
            return Some(vec![Cue::Emptied]);
        }

        let Some(cursor) = self.current_index else {
            return Some(Vec::new());
        };
        match rebase_cursor(cursor, index, None) {
            Some(shifted) => {
                self.current_index = Some(shifted);
                Some(Vec::new())
            }
            None => {
                // The active track was removed: the next one slides into its slot.
                let replacement = index.min(self.playlist.len() - 1);
                Some(vec![self.jump_to(replacement, 0.0)])
            }
        }
    }

    fn move_track(&mut self, from: i64, to: i64) -> Option<Vec<Cue>> {
        let len = self.len();
        let from = clamp_index(from, len)?;
        let to = clamp_index(to, len)?;
        if from == to {
            return None;
        }
        let track = self.playlist.remove(from);
        self.playlist.insert(to, track);
        self.reindex();
        self.current_index = self
            .current_index
            .and_then(|cursor| rebase_cursor(cursor, from, Some(to)));
        Some(Vec::new())
    }

    fn jump_to(&mut self, index: usize, seek: f64) -> Cue {
        self.current_index = Some(index);
        self.is_playing = true;
        self.current_time = seek;
        Cue::Jump { index, seek }
    }

    fn reindex(&mut self) {
        for (i, track) in self.playlist.iter_mut().enumerate() {
            track.position = i;
        }
    }
}

// ---------------------------------------------------------------------------
// Index arithmetic
// ---------------------------------------------------------------------------

/// Where the cursor lands after the element at `from` moves to `to`.
///
/// `to == None` means the element was removed; the result is then `None`
/// only when the cursor pointed at the removed element.
pub fn rebase_cursor(cursor: usize, from: usize, to: Option<usize>) -> Option<usize> {
    if cursor == from {
        return to;
    }
    match to {
        None if from < cursor => Some(cursor - 1),
        None => Some(cursor),
        Some(to) if from < cursor && cursor <= to => Some(cursor - 1),
        Some(to) if to <= cursor && cursor < from => Some(cursor + 1),
        Some(_) => Some(cursor),
    }
}

/// Clamp a peer-supplied index into `[0, len)`; `None` for an empty list.
pub fn clamp_index(index: i64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    Some(index.clamp(0, last as i64) as usize)
}

/// Clamp a seek position into `[0, MAX_SEEK_SECS]`; non-finite values become 0.
pub fn clamp_seek(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.clamp(0.0, MAX_SEEK_SECS)
    } else {
        0.0
    }
}

/// `currentIndex` travels as an integer where `-1` means "none active".
mod cursor_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cursor: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(cursor.map_or(-1, |i| i as i64))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(usize::try_from(raw).ok())
    }
}
