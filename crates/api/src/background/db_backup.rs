//! Periodic copy of the database image into the backup directory.
//!
//! Runs on a fixed interval regardless of write activity. The copy is taken
//! with `VACUUM INTO`, which SQLite keeps consistent while writers continue,
//! and old images are pruned by count.

use std::time::Duration;

use campfire_db::DbPool;
use campfire_sync::BackupWriter;
use tokio_util::sync::CancellationToken;

/// Run the database backup loop until `cancel` is triggered.
///
/// The first copy is taken immediately on start.
pub async fn run(pool: DbPool, backups: BackupWriter, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        dir = %backups.dir().display(),
        "Database backup job started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Database backup job stopping");
                break;
            }
            _ = interval.tick() => {
                match backups.snapshot_database(&pool).await {
                    Ok(path) => {
                        tracing::info!(path = %path.display(), "Database backup written");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Database backup failed");
                    }
                }
            }
        }
    }
}
