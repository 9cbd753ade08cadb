use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use campfire_events::{CampaignEvent, CampaignRequest, Channel, JukeboxRequest};
use futures::{SinkExt, StreamExt};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/v1/ws/campaign -- upgrade to the campaign channel.
pub async fn campaign_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Channel::Campaign))
}

/// GET /api/v1/ws/jukebox -- upgrade to the jukebox channel.
pub async fn jukebox_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Channel::Jukebox))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Queues the full current state for the new peer.
///   4. Dispatches inbound frames on the current task.
///   5. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, channel: Channel) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, %channel, "WebSocket connected");

    // Register before the initial sync so the fan-out can reach this peer.
    let mut rx = state.ws_manager.add(conn_id.clone(), channel).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    sync_peer(&state, channel, &conn_id).await;

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match channel {
                Channel::Campaign => on_campaign_frame(&state, &conn_id, text.as_str()).await,
                Channel::Jukebox => on_jukebox_frame(&state, &conn_id, text.as_str()).await,
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, %channel, "WebSocket disconnected");
}

async fn sync_peer(state: &AppState, channel: Channel, conn_id: &str) {
    match channel {
        Channel::Campaign => state.documents.sync_peer(conn_id).await,
        Channel::Jukebox => state.playlist.sync_peer(conn_id).await,
    }
}

// ---------------------------------------------------------------------------
// Campaign channel
// ---------------------------------------------------------------------------

async fn on_campaign_frame(state: &AppState, conn_id: &str, text: &str) {
    let request = match serde_json::from_str::<CampaignRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Unrecognized campaign frame");
            reject(state, conn_id, AppError::BadRequest(format!("Unrecognized frame: {e}")));
            return;
        }
    };

    match request {
        CampaignRequest::SyncRequest => state.documents.sync_peer(conn_id).await,
        CampaignRequest::Update(candidate) => {
            if let Err(e) = state.documents.put_from(conn_id, candidate).await {
                reject(state, conn_id, e.into());
            }
        }
    }
}

/// Report a refused request back to its sender only.
fn reject(state: &AppState, conn_id: &str, err: AppError) {
    let (_, code, message) = err.classify();
    state.event_bus.send_to(
        conn_id,
        CampaignEvent::Rejected {
            code: code.to_string(),
            message,
        },
    );
}

// ---------------------------------------------------------------------------
// Jukebox channel
// ---------------------------------------------------------------------------

async fn on_jukebox_frame(state: &AppState, conn_id: &str, text: &str) {
    let request = match serde_json::from_str::<JukeboxRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Ignoring unrecognized jukebox frame");
            return;
        }
    };

    let Some(command) = request.into_command() else {
        state.playlist.sync_peer(conn_id).await;
        return;
    };

    if let Err(e) = state.playlist.apply(command, Some(conn_id)).await {
        tracing::error!(conn_id, error = %e, "Playlist command failed");
    }
}
