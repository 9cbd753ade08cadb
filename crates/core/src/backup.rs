//! Backup file naming and count-based retention.
//!
//! The backup tier is a directory of timestamped files grouped by prefix
//! (`campaign-…json`, `jukebox-…json`, `campaign.db-…bak`). Timestamps are
//! formatted so lexicographic order equals chronological order.

use crate::types::Timestamp;

/// Default number of files kept per prefix.
pub const DEFAULT_MAX_BACKUPS: usize = 50;

/// Default interval between copies of the database image.
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 600;

/// Prefix of the periodic database image copies.
pub const DATABASE_IMAGE_PREFIX: &str = "campaign.db";

/// Prefix of the per-write document copies.
pub const CAMPAIGN_BACKUP_PREFIX: &str = "campaign";

/// Prefix of the per-command playlist copies.
pub const JUKEBOX_BACKUP_PREFIX: &str = "jukebox";

/// Filesystem-safe, sortable timestamp (`2026-10-17T09-30-00-123Z`).
pub fn backup_stamp(at: Timestamp) -> String {
    at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// File name for a backup taken at `at`.
pub fn backup_file_name(prefix: &str, extension: &str, at: Timestamp) -> String {
    format!("{prefix}-{}.{extension}", backup_stamp(at))
}

/// Names of files that fall outside the newest `keep` for `prefix`.
///
/// Files belonging to other prefixes are never selected.
pub fn files_to_prune<'a, I>(names: I, prefix: &str, keep: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let marker = format!("{prefix}-");
    let mut matching: Vec<&str> = names
        .into_iter()
        .filter(|name| name.starts_with(&marker))
        .collect();
    matching.sort_unstable_by(|a, b| b.cmp(a));
    matching
        .into_iter()
        .skip(keep)
        .map(str::to_string)
        .collect()
}
