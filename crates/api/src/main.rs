use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campfire_api::config::ServerConfig;
use campfire_api::fanout::FanoutRouter;
use campfire_api::router::build_app_router;
use campfire_api::state::AppState;
use campfire_api::{background, ws};
use campfire_sync::{BackupWriter, DocumentSync, PlaylistSync};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campfire_api=debug,campfire_sync=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    if let Some(dir) = config.database_dir() {
        std::fs::create_dir_all(&dir).expect("Failed to create database directory");
    }

    let pool = campfire_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    tracing::info!("Database connection pool created");

    campfire_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    campfire_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(campfire_events::EventBus::default());
    tracing::info!("Event bus created");

    // --- State owners ---
    let backups = BackupWriter::new(&config.backup_dir, config.max_backups);

    let documents = DocumentSync::load(
        pool.clone(),
        Arc::clone(&event_bus),
        Some(backups.clone()),
        config.bootstrap_path.as_deref(),
        config.max_document_bytes,
    )
    .await
    .expect("Failed to load campaign document");

    let playlist = PlaylistSync::load(pool.clone(), Arc::clone(&event_bus), Some(backups.clone()))
        .await
        .expect("Failed to load playlist");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), ws::HEARTBEAT_INTERVAL);

    // Spawn fan-out router (delivers bus envelopes to peers).
    let fanout = FanoutRouter::new(Arc::clone(&ws_manager));
    let fanout_handle = tokio::spawn(fanout.run(event_bus.subscribe()));

    // Spawn periodic database backups.
    let backup_cancel = tokio_util::sync::CancellationToken::new();
    let backup_handle = tokio::spawn(background::db_backup::run(
        pool.clone(),
        backups,
        Duration::from_secs(config.backup_interval_secs),
        backup_cancel.clone(),
    ));

    tracing::info!("Background services started (fan-out, heartbeat, database backups)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus,
        documents: Arc::new(documents),
        playlist: Arc::new(playlist),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    // Stop database backups.
    backup_cancel.cancel();
    let _ = tokio::time::timeout(drain, backup_handle).await;
    tracing::info!("Database backup job stopped");

    // Close sockets first: their handler tasks hold the last state handles,
    // and the bus closes once those are gone.
    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    if tokio::time::timeout(drain, fanout_handle).await.is_err() {
        tracing::warn!("Fan-out router did not stop in time");
    }

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
