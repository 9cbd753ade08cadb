//! WebSocket infrastructure for the live channels.
//!
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handlers for the campaign and jukebox channels.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{campaign_ws_handler, jukebox_ws_handler};
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::WsManager;
