//! Tests for `FanoutRouter` delivery of bus envelopes to socket queues.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use campfire_api::fanout::FanoutRouter;
use campfire_api::ws::WsManager;
use campfire_events::protocol::{CampaignEvent, DocumentPayload, JukeboxEvent};
use campfire_events::{Channel, Envelope, EventBus, Target};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

fn frame(rx: &mut UnboundedReceiver<Message>) -> serde_json::Value {
    match rx.try_recv().expect("expected a queued frame") {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("unexpected message: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: events are framed once and honour their target
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_respects_target() {
    let manager = Arc::new(WsManager::new());
    let mut a = manager.add("a".to_string(), Channel::Jukebox).await;
    let mut b = manager.add("b".to_string(), Channel::Jukebox).await;
    let router = FanoutRouter::new(Arc::clone(&manager));

    router
        .route(&Envelope::new(JukeboxEvent::Seek { seconds: 42.0 }, Target::AllExcept("a".into())))
        .await;
    assert!(a.try_recv().is_err());
    assert_eq!(frame(&mut b), json!({ "event": "seek", "data": { "seconds": 42.0 } }));

    router
        .route(&Envelope::new(JukeboxEvent::Paused, Target::Peer("a".into())))
        .await;
    assert_eq!(frame(&mut a), json!({ "event": "paused" }));
    assert!(b.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: campaign events never reach jukebox peers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_is_channel_scoped() {
    let manager = Arc::new(WsManager::new());
    let mut campaign = manager.add("c".to_string(), Channel::Campaign).await;
    let mut jukebox = manager.add("j".to_string(), Channel::Jukebox).await;
    let router = FanoutRouter::new(Arc::clone(&manager));

    let payload = DocumentPayload {
        data: json!({ "notes": "hi" }),
        version: "abc".into(),
    };
    router
        .route(&Envelope::new(CampaignEvent::State(payload), Target::All))
        .await;

    let received = frame(&mut campaign);
    assert_eq!(received["event"], "state:broadcast");
    assert_eq!(received["data"]["version"], "abc");
    assert!(jukebox.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: run() preserves publish order and stops when the bus is dropped
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_forwards_in_order_and_exits_on_close() {
    let manager = Arc::new(WsManager::new());
    let mut peer = manager.add("p".to_string(), Channel::Jukebox).await;
    let bus = EventBus::default();
    let handle = tokio::spawn(FanoutRouter::new(Arc::clone(&manager)).run(bus.subscribe()));

    bus.broadcast(JukeboxEvent::PlayIndex { index: 2, seek: 0.0 });
    bus.broadcast(JukeboxEvent::Volume { volume: 40 });
    drop(bus);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("router should exit once the bus is gone")
        .unwrap();

    assert_eq!(frame(&mut peer)["event"], "play_index");
    assert_eq!(frame(&mut peer), json!({ "event": "volume", "data": { "volume": 40 } }));
    assert!(peer.try_recv().is_err());
}
