pub mod campaign;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /campaign                    GET current document, PUT candidate
/// /campaign/snapshots          GET snapshot metadata
/// /campaign/restore/{id}       POST restore
///
/// /ws/campaign                 WebSocket, campaign channel
/// /ws/jukebox                  WebSocket, jukebox channel
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/campaign", campaign::router())
        .route("/ws/campaign", get(ws::campaign_ws_handler))
        .route("/ws/jukebox", get(ws::jukebox_ws_handler))
}
