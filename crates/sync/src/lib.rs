//! The two state owners of a campfire session.
//!
//! - [`DocumentSync`] guards the shared campaign document: optimistic
//!   concurrency, snapshot history and restore.
//! - [`PlaylistSync`] runs jukebox commands through the playlist state
//!   machine.
//!
//! Both serialize their read-modify-persist-publish cycle behind one async
//! mutex and publish to the [`EventBus`](campfire_events::EventBus) before
//! releasing it, so peers observe mutations in admission order.

pub mod backup;
pub mod bootstrap;
pub mod document;
pub mod error;
pub mod playlist;

pub use backup::BackupWriter;
pub use document::{DocumentSync, DocumentView, WriteReceipt};
pub use error::SyncError;
pub use playlist::PlaylistSync;
