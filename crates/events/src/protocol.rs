//! JSON frames exchanged with peers.
//!
//! Every frame is `{"event": "<name>", "data": <payload>}`; events without a
//! payload omit `data`. Inbound numbers are read leniently (floats are
//! truncated) because control commands are clamped, never rejected.

use std::fmt;

use campfire_core::playlist::{NewTrack, PlaylistCommand, PlaylistState};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Logical channel a peer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Campaign,
    Jukebox,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Campaign => "campaign",
            Channel::Jukebox => "jukebox",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Full document payload pushed on the campaign channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub data: serde_json::Value,
    pub version: String,
}

/// Events sent to campaign peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum CampaignEvent {
    /// Authoritative full document.
    #[serde(rename = "state:broadcast")]
    State(DocumentPayload),
    /// A write from this peer was refused.
    #[serde(rename = "error")]
    Rejected { code: String, message: String },
}

/// Events sent to jukebox peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum JukeboxEvent {
    /// Authoritative full state.
    State(PlaylistState),
    /// Targeted jump, sent ahead of the full state.
    PlayIndex { index: usize, seek: f64 },
    Paused,
    Resumed,
    Volume { volume: u8 },
    Seek { seconds: f64 },
    Toast { message: String },
}

/// Any outbound event; serializes as the inner frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyncEvent {
    Campaign(CampaignEvent),
    Jukebox(JukeboxEvent),
}

impl SyncEvent {
    /// Channel whose peers receive this event.
    pub fn channel(&self) -> Channel {
        match self {
            SyncEvent::Campaign(_) => Channel::Campaign,
            SyncEvent::Jukebox(_) => Channel::Jukebox,
        }
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::Campaign(CampaignEvent::State(_)) => "state:broadcast",
            SyncEvent::Campaign(CampaignEvent::Rejected { .. }) => "error",
            SyncEvent::Jukebox(event) => match event {
                JukeboxEvent::State(_) => "state",
                JukeboxEvent::PlayIndex { .. } => "play_index",
                JukeboxEvent::Paused => "paused",
                JukeboxEvent::Resumed => "resumed",
                JukeboxEvent::Volume { .. } => "volume",
                JukeboxEvent::Seek { .. } => "seek",
                JukeboxEvent::Toast { .. } => "toast",
            },
        }
    }

    /// Serialize to the JSON text frame sent over the socket.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<CampaignEvent> for SyncEvent {
    fn from(event: CampaignEvent) -> Self {
        SyncEvent::Campaign(event)
    }
}

impl From<JukeboxEvent> for SyncEvent {
    fn from(event: JukeboxEvent) -> Self {
        SyncEvent::Jukebox(event)
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Requests a campaign peer may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum CampaignRequest {
    /// Replace the document (guarded like an HTTP write without precondition).
    #[serde(rename = "state:update")]
    Update(serde_json::Value),
    #[serde(rename = "sync_request")]
    SyncRequest,
}

/// Requests a jukebox peer may send.
///
/// Parsed from a loose `{"event", "data"}` frame: numeric fields accept
/// numbers or numeric strings and fall back to `0` when missing or garbled,
/// and commands without arguments ignore whatever `data` carries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFrame")]
pub enum JukeboxRequest {
    SyncRequest,
    AddTrack(NewTrack),
    RemoveIndex { index: f64 },
    Reorder { from: f64, to: f64 },
    PlayIndex { index: f64, seek: f64 },
    Pause,
    Resume,
    SkipNext,
    SkipPrev,
    /// `None` keeps the current volume.
    SetVolume { volume: Option<f64> },
    SeekTo { seconds: f64 },
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl TryFrom<RawFrame> for JukeboxRequest {
    type Error = String;

    fn try_from(frame: RawFrame) -> Result<Self, Self::Error> {
        let data = &frame.data;
        let request = match frame.event.as_str() {
            "sync_request" => JukeboxRequest::SyncRequest,
            "add_track" => JukeboxRequest::AddTrack(NewTrack::deserialize(data).unwrap_or_default()),
            "remove_index" => JukeboxRequest::RemoveIndex {
                index: number_or_zero(data, "index"),
            },
            "reorder" => JukeboxRequest::Reorder {
                from: number_or_zero(data, "from"),
                to: number_or_zero(data, "to"),
            },
            "play_index" => JukeboxRequest::PlayIndex {
                index: number_or_zero(data, "index"),
                seek: number_or_zero(data, "seek"),
            },
            "pause" => JukeboxRequest::Pause,
            "resume" => JukeboxRequest::Resume,
            "skip_next" => JukeboxRequest::SkipNext,
            "skip_prev" => JukeboxRequest::SkipPrev,
            "set_volume" => JukeboxRequest::SetVolume {
                volume: number(data, "volume"),
            },
            "seek_to" => JukeboxRequest::SeekTo {
                seconds: number_or_zero(data, "seconds"),
            },
            other => return Err(format!("unknown jukebox event `{other}`")),
        };
        Ok(request)
    }
}

/// Read `data[key]` as a finite number; numeric strings count.
fn number(data: &serde_json::Value, key: &str) -> Option<f64> {
    let value = match data.get(key)? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn number_or_zero(data: &serde_json::Value, key: &str) -> f64 {
    number(data, key).unwrap_or(0.0)
}

impl JukeboxRequest {
    /// The state-machine command for this request; `None` for `sync_request`.
    pub fn into_command(self) -> Option<PlaylistCommand> {
        let command = match self {
            JukeboxRequest::SyncRequest => return None,
            JukeboxRequest::AddTrack(track) => PlaylistCommand::AddTrack(track),
            JukeboxRequest::RemoveIndex { index } => PlaylistCommand::RemoveAt(index as i64),
            JukeboxRequest::Reorder { from, to } => PlaylistCommand::Move {
                from: from as i64,
                to: to as i64,
            },
            JukeboxRequest::PlayIndex { index, seek } => PlaylistCommand::PlayAt {
                index: index as i64,
                seek,
            },
            JukeboxRequest::Pause => PlaylistCommand::Pause,
            JukeboxRequest::Resume => PlaylistCommand::Resume,
            JukeboxRequest::SkipNext => PlaylistCommand::SkipNext,
            JukeboxRequest::SkipPrev => PlaylistCommand::SkipPrev,
            // A missing volume keeps the current one.
            JukeboxRequest::SetVolume { volume } => {
                PlaylistCommand::SetVolume(volume.unwrap_or(f64::NAN))
            }
            JukeboxRequest::SeekTo { seconds } => PlaylistCommand::SeekTo(seconds),
        };
        Some(command)
    }
}
