use axum::extract::State;
use axum::{routing::get, Json, Router};
use campfire_events::Channel;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Version token of the current campaign document.
    pub document_version: String,
    pub peers: PeerCounts,
}

/// Live sockets per channel.
#[derive(Serialize)]
pub struct PeerCounts {
    pub campaign: usize,
    pub jukebox: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = campfire_db::health_check(&state.pool).await.is_ok();
    let peers = PeerCounts {
        campaign: state.ws_manager.channel_count(Channel::Campaign).await,
        jukebox: state.ws_manager.channel_count(Channel::Jukebox).await,
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        document_version: state.documents.version().await,
        peers,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
