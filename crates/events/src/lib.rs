//! Campfire event bus and wire protocol.
//!
//! - [`EventBus`] - in-process fan-out hub backed by `tokio::sync::broadcast`,
//!   carrying addressed [`Envelope`]s in publish order.
//! - [`protocol`] - JSON frames exchanged with peers over WebSocket, both
//!   inbound requests and outbound events.
//! - [`reconcile`] - how a player applies an authoritative full state
//!   without glitching.

pub mod bus;
pub mod protocol;
pub mod reconcile;

pub use bus::{Envelope, EventBus, Target};
pub use protocol::{
    CampaignEvent, CampaignRequest, Channel, JukeboxEvent, JukeboxRequest, SyncEvent,
};
