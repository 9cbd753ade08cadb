//! Best-effort backup tier next to the primary store.
//!
//! Three kinds of files share one directory: per-write document copies,
//! per-command playlist copies and periodic images of the database file.
//! Each prefix keeps at most `max_files` entries. Failures here are logged
//! by the callers and never reach a peer.

use std::path::{Path, PathBuf};

use campfire_core::backup::{backup_file_name, files_to_prune, DATABASE_IMAGE_PREFIX};
use campfire_core::types::Timestamp;
use campfire_db::DbPool;
use chrono::Utc;
use tokio::fs;

use crate::error::SyncError;

#[derive(Debug, Clone)]
pub struct BackupWriter {
    dir: PathBuf,
    max_files: usize,
}

impl BackupWriter {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `contents` to `<prefix>-<stamp>.json` and prune old copies.
    pub async fn write_json(
        &self,
        prefix: &str,
        contents: &str,
        at: Timestamp,
    ) -> Result<PathBuf, SyncError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(backup_file_name(prefix, "json", at));
        fs::write(&path, contents).await?;
        self.prune(prefix).await?;
        Ok(path)
    }

    /// Fire-and-forget variant of [`write_json`](Self::write_json).
    ///
    /// The file is stamped with `at` (the commit time), not the time the
    /// background task gets to run.
    pub fn spawn_json(&self, prefix: &'static str, contents: String, at: Timestamp) {
        let writer = self.clone();
        tokio::spawn(async move {
            match writer.write_json(prefix, &contents, at).await {
                Ok(path) => tracing::debug!(path = %path.display(), "Backup file written"),
                Err(e) => tracing::warn!(error = %e, prefix, "Backup file write failed"),
            }
        });
    }

    /// Copy the live database into the backup directory and prune old images.
    pub async fn snapshot_database(&self, pool: &DbPool) -> Result<PathBuf, SyncError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(backup_file_name(DATABASE_IMAGE_PREFIX, "bak", Utc::now()));
        campfire_db::backup_into(pool, &path).await?;
        self.prune(DATABASE_IMAGE_PREFIX).await?;
        Ok(path)
    }

    /// Delete the oldest files of `prefix` beyond the retention count.
    ///
    /// Returns the number of files removed.
    pub async fn prune(&self, prefix: &str) -> Result<usize, SyncError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        let doomed = files_to_prune(names.iter().map(String::as_str), prefix, self.max_files);
        for name in &doomed {
            fs::remove_file(self.dir.join(name)).await?;
        }
        if !doomed.is_empty() {
            tracing::debug!(prefix, removed = doomed.len(), "Pruned old backups");
        }
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[tokio::test]
    async fn write_json_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = BackupWriter::new(tmp.path().join("nested/backups"), 5);
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let path = writer.write_json("campaign", "{}", at).await.unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "campaign-2026-03-01T12-00-00-000Z.json"
        );
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn retention_is_per_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = BackupWriter::new(tmp.path(), 2);
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        for i in 0..4 {
            let at = start + Duration::seconds(i);
            writer.write_json("campaign", "{}", at).await.unwrap();
        }
        writer.write_json("jukebox", "{}", start).await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(tmp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        assert_eq!(
            names,
            vec![
                "campaign-2026-03-01T12-00-02-000Z.json",
                "campaign-2026-03-01T12-00-03-000Z.json",
                "jukebox-2026-03-01T12-00-00-000Z.json",
            ]
        );
    }
}
