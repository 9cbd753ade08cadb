//! Persistent store for the campaign document and the jukebox playlist.
//!
//! SQLite in WAL mode with `synchronous = FULL`: every accepted write is a
//! single transaction, and the live file can be copied consistently with
//! [`backup_into`] while writers keep going.

pub mod models;
pub mod repositories;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

pub type DbPool = sqlx::SqlitePool;

/// Maximum pooled connections. SQLite serializes writers anyway.
const MAX_CONNECTIONS: u32 = 8;

/// Create a connection pool from a database URL (e.g. `sqlite://data/campaign.db`).
///
/// The database file is created if it does not exist yet; its parent
/// directory must already exist.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
}

/// Cheap round trip used by the `/health` endpoint and at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Write a transactionally consistent copy of the live database to `target`.
///
/// `target` must not exist yet.
pub async fn backup_into(pool: &DbPool, target: &Path) -> Result<(), sqlx::Error> {
    let target = target.to_string_lossy();
    sqlx::query("VACUUM INTO ?")
        .bind(target.as_ref())
        .execute(pool)
        .await?;
    tracing::debug!(target = %target, "Database image copied");
    Ok(())
}
