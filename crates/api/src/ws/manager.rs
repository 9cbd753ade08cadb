use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use campfire_core::types::Timestamp;
use campfire_events::{Channel, Target};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Which live channel the peer joined.
    pub channel: Channel,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Every connection owns an unbounded queue
/// drained by its own sender task, so pushing never waits on a slow peer.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, channel: Channel) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            channel,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Push `message` to the peers of `channel` selected by `target`.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    /// Returns the number of connections the message was queued for.
    pub async fn deliver(&self, channel: Channel, target: &Target, message: Message) -> usize {
        let conns = self.connections.read().await;

        if let Target::Peer(conn_id) = target {
            return match conns.get(conn_id) {
                Some(conn) if conn.channel == channel => {
                    usize::from(conn.sender.send(message).is_ok())
                }
                _ => 0,
            };
        }

        let mut count = 0;
        for (id, conn) in conns.iter() {
            if conn.channel != channel {
                continue;
            }
            if matches!(target, Target::AllExcept(skip) if skip == id) {
                continue;
            }
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Broadcast a message to every peer of a channel.
    pub async fn broadcast(&self, channel: Channel, message: Message) -> usize {
        self.deliver(channel, &Target::All, message).await
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of connections on one channel.
    pub async fn channel_count(&self, channel: Channel) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.channel == channel)
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// process exits.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
