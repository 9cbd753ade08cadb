use std::sync::Arc;

use axum::extract::ws::Message;
use campfire_events::Envelope;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes bus envelopes to WebSocket peers.
pub struct FanoutRouter {
    ws_manager: Arc<WsManager>,
}

impl FanoutRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. every
    /// [`EventBus`](campfire_events::EventBus) handle is dropped). A lagged
    /// receiver skips ahead; peers heal on the next full state.
    pub async fn run(self, mut receiver: broadcast::Receiver<Envelope>) {
        loop {
            match receiver.recv().await {
                Ok(envelope) => self.route(&envelope).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Fan-out router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, fan-out router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single envelope.
    pub async fn route(&self, envelope: &Envelope) {
        let frame = match envelope.event.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, event = envelope.event.name(), "Failed to serialize event");
                return;
            }
        };

        let delivered = self
            .ws_manager
            .deliver(envelope.channel(), &envelope.target, Message::Text(frame.into()))
            .await;

        tracing::trace!(
            event = envelope.event.name(),
            channel = %envelope.channel(),
            delivered,
            "Event fanned out"
        );
    }
}
