use std::sync::Arc;

use campfire_events::EventBus;
use campfire_sync::{DocumentSync, PlaylistSync};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campfire_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Connected peers on both channels.
    pub ws_manager: Arc<WsManager>,
    /// Ordered outbound events, drained by the fan-out task.
    pub event_bus: Arc<EventBus>,
    /// Owner of the campaign document.
    pub documents: Arc<DocumentSync>,
    /// Owner of the jukebox playlist.
    pub playlist: Arc<PlaylistSync>,
}
