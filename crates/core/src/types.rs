/// Primary keys of the append-only tables are SQLite `INTEGER PRIMARY KEY`s.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of one connected peer (a WebSocket connection id).
pub type PeerId = String;
