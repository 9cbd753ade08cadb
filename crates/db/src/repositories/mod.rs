//! Repository layer: one zero-sized struct per table group, all methods
//! take the pool explicitly.

pub mod document_repo;
pub mod playlist_repo;
pub mod snapshot_repo;

pub use document_repo::DocumentRepo;
pub use playlist_repo::PlaylistRepo;
pub use snapshot_repo::SnapshotRepo;
