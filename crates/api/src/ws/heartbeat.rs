use std::sync::Arc;
use std::time::Duration;

use campfire_events::Channel;
use tokio::task::JoinHandle;

use crate::ws::manager::WsManager;

/// How often every peer is pinged.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every connected peer each `every`, until the handle is aborted.
///
/// Pings keep idle sockets open through proxies; a peer whose sink has gone
/// away is dropped by its own receive loop.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The immediate first tick would ping peers that just connected.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let campaign = ws_manager.channel_count(Channel::Campaign).await;
            let jukebox = ws_manager.channel_count(Channel::Jukebox).await;
            tracing::trace!(campaign, jukebox, "Heartbeat");
            ws_manager.ping_all().await;
        }
    })
}
