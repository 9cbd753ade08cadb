#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use campfire_api::config::ServerConfig;
use campfire_api::fanout::FanoutRouter;
use campfire_api::router::build_app_router;
use campfire_api::state::AppState;
use campfire_api::ws::WsManager;
use campfire_core::document::MAX_DOCUMENT_BYTES;
use campfire_events::EventBus;
use campfire_sync::{DocumentSync, PlaylistSync};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        backup_dir: "target/test-backups".into(),
        max_backups: 5,
        backup_interval_secs: 600,
        bootstrap_path: None,
        max_document_bytes: MAX_DOCUMENT_BYTES,
        body_limit_bytes: 5 * 1024 * 1024,
    }
}

/// Build application state over `pool` with the given config.
///
/// No backup writer is attached, so tests leave no files behind.
pub async fn build_state(pool: SqlitePool, config: ServerConfig) -> AppState {
    let event_bus = Arc::new(EventBus::default());

    let documents = DocumentSync::load(
        pool.clone(),
        Arc::clone(&event_bus),
        None,
        None,
        config.max_document_bytes,
    )
    .await
    .unwrap();
    let playlist = PlaylistSync::load(pool.clone(), Arc::clone(&event_bus), None)
        .await
        .unwrap();

    AppState {
        pool,
        config: Arc::new(config),
        ws_manager: Arc::new(WsManager::new()),
        event_bus,
        documents: Arc::new(documents),
        playlist: Arc::new(playlist),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub async fn build_test_app(pool: SqlitePool) -> Router {
    let config = test_config();
    let state = build_state(pool, config.clone()).await;
    build_app_router(state, &config)
}

/// Serve the app on an ephemeral port with the fan-out running, for tests
/// that need real WebSocket clients.
pub async fn spawn_server(pool: SqlitePool) -> (SocketAddr, AppState) {
    let config = test_config();
    let state = build_state(pool, config.clone()).await;

    let fanout = FanoutRouter::new(Arc::clone(&state.ws_manager));
    tokio::spawn(fanout.run(state.event_bus.subscribe()));

    let app = build_app_router(state.clone(), &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, &[], Body::empty()).await
}

/// Send a request with a JSON body.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: &serde_json::Value,
) -> Response {
    send(app, method, uri, headers, Body::from(body.to_string())).await
}

/// Send an arbitrary request through the router.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Body,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
