//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! State owners publish [`Envelope`]s while still holding their session
//! lock, so the order envelopes leave the bus is the order mutations were
//! admitted. Designed to be shared via `Arc<EventBus>`.

use campfire_core::types::{PeerId, Timestamp};
use chrono::Utc;
use tokio::sync::broadcast;

use crate::protocol::{Channel, SyncEvent};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Which peers of the event's channel receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    AllExcept(PeerId),
    Peer(PeerId),
}

/// An outbound event plus its addressing.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub event: SyncEvent,
    pub target: Target,
    /// When the event was published (UTC).
    pub timestamp: Timestamp,
}

impl Envelope {
    pub fn new(event: impl Into<SyncEvent>, target: Target) -> Self {
        Self {
            event: event.into(),
            target,
            timestamp: Utc::now(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.event.channel()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`Envelope`].
///
/// # Usage
///
/// ```rust
/// use campfire_events::bus::EventBus;
/// use campfire_events::protocol::JukeboxEvent;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.broadcast(JukeboxEvent::Paused);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed envelopes are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an envelope to all current subscribers.
    ///
    /// If there are no active subscribers the envelope is silently dropped.
    pub fn publish(&self, envelope: Envelope) {
        // Ignore the SendError - it only means there are zero receivers.
        let _ = self.sender.send(envelope);
    }

    /// Publish to every peer of the event's channel.
    pub fn broadcast(&self, event: impl Into<SyncEvent>) {
        self.publish(Envelope::new(event, Target::All));
    }

    /// Publish to every peer of the event's channel except `origin`.
    pub fn broadcast_except(&self, origin: &str, event: impl Into<SyncEvent>) {
        self.publish(Envelope::new(event, Target::AllExcept(origin.to_string())));
    }

    /// Publish to a single peer.
    pub fn send_to(&self, peer: &str, event: impl Into<SyncEvent>) {
        self.publish(Envelope::new(event, Target::Peer(peer.to_string())));
    }

    /// Subscribe to all envelopes published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
