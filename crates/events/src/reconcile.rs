//! Applying an authoritative full state on the receiving side.
//!
//! A `state` push may arrive right after a targeted `play_index` for the
//! same mutation. Receivers only reload media when the active track's
//! identity changed and only seek when drift exceeds a small tolerance, so
//! applying the full state is idempotent and glitch-free.

use campfire_core::playlist::PlaylistState;

/// Drift (seconds) below which a playing receiver is left alone.
pub const DRIFT_TOLERANCE_SECS: f64 = 1.5;

/// What the local player is doing right now.
#[derive(Debug, Clone, Default)]
pub struct PlayerView<'a> {
    /// Source id of the loaded media, if any.
    pub loaded_source: Option<&'a str>,
    /// Local playback position in seconds.
    pub position: f64,
}

/// Media-level action for the local player.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaAction {
    /// Load a different track and start at `seek`.
    Load { index: usize, seek: f64 },
    /// Same track, but drifted too far: jump to `seek`.
    Seek(f64),
    /// Same track, close enough.
    Keep,
}

/// Everything a receiver should do with a full state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub media: MediaAction,
    pub playing: bool,
    pub volume: u8,
}

/// Decide how to apply `incoming`; `None` when no track is active.
pub fn reconcile(incoming: &PlaylistState, local: &PlayerView<'_>) -> Option<Reconciliation> {
    let index = incoming.current_index()?;
    let track = incoming.current_track()?;
    let desired = incoming.current_time().max(0.0);

    let media = if local.loaded_source != Some(track.source_id.as_str()) {
        MediaAction::Load {
            index,
            seek: desired,
        }
    } else if (local.position.max(0.0) - desired).abs() > DRIFT_TOLERANCE_SECS {
        MediaAction::Seek(desired)
    } else {
        MediaAction::Keep
    };

    Some(Reconciliation {
        media,
        playing: incoming.is_playing(),
        volume: incoming.volume(),
    })
}
