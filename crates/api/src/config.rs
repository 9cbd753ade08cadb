use std::path::{Path, PathBuf};

use campfire_core::backup::{DEFAULT_BACKUP_INTERVAL_SECS, DEFAULT_MAX_BACKUPS};
use campfire_core::document::MAX_DOCUMENT_BYTES;

/// Default request body ceiling; larger than the document ceiling so an
/// oversized document is rejected with the domain error, not a bare 413.
const DEFAULT_BODY_LIMIT_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks to drain (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// SQLite database URL.
    pub database_url: String,
    /// Directory for backup files.
    pub backup_dir: PathBuf,
    /// Files kept per backup kind.
    pub max_backups: usize,
    /// Seconds between database image copies.
    pub backup_interval_secs: u64,
    /// Seed for the document when the store is empty; `None` when unset.
    pub bootstrap_path: Option<PathBuf>,
    /// Ceiling for a serialized document.
    pub max_document_bytes: usize,
    /// Ceiling for any request body.
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                      |
    /// |-------------------------|------------------------------|
    /// | `HOST`                  | `0.0.0.0`                    |
    /// | `PORT`                  | `3000`                       |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                         |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                         |
    /// | `DATABASE_URL`          | `sqlite://data/campaign.db`  |
    /// | `BACKUP_DIR`            | `data/backups`               |
    /// | `MAX_BACKUPS`           | `50`                         |
    /// | `BACKUP_INTERVAL_SECS`  | `600`                        |
    /// | `BOOTSTRAP_PATH`        | `campaign.json` (empty: off) |
    /// | `MAX_DOCUMENT_BYTES`    | `2500000`                    |
    /// | `BODY_LIMIT_BYTES`      | `5242880`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/campaign.db".into());

        let backup_dir: PathBuf = std::env::var("BACKUP_DIR")
            .unwrap_or_else(|_| "data/backups".into())
            .into();

        let max_backups: usize = std::env::var("MAX_BACKUPS")
            .map(|v| v.parse().expect("MAX_BACKUPS must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_BACKUPS);

        let backup_interval_secs: u64 = std::env::var("BACKUP_INTERVAL_SECS")
            .map(|v| v.parse().expect("BACKUP_INTERVAL_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_BACKUP_INTERVAL_SECS);

        let bootstrap_path = std::env::var("BOOTSTRAP_PATH")
            .unwrap_or_else(|_| "campaign.json".into());
        let bootstrap_path = (!bootstrap_path.trim().is_empty()).then(|| bootstrap_path.into());

        let max_document_bytes: usize = std::env::var("MAX_DOCUMENT_BYTES")
            .map(|v| v.parse().expect("MAX_DOCUMENT_BYTES must be a valid usize"))
            .unwrap_or(MAX_DOCUMENT_BYTES);

        let body_limit_bytes: usize = std::env::var("BODY_LIMIT_BYTES")
            .map(|v| v.parse().expect("BODY_LIMIT_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_BODY_LIMIT_BYTES);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            backup_dir,
            max_backups,
            backup_interval_secs,
            bootstrap_path,
            max_document_bytes,
            body_limit_bytes,
        }
    }

    /// Directory holding the database file, if the URL names one.
    ///
    /// `None` for in-memory databases and bare file names.
    pub fn database_dir(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}
