//! Domain logic shared by every campfire crate.
//!
//! Nothing in here performs I/O: the store, the event bus and the HTTP layer
//! all live in their own crates and call into these pure functions.

pub mod backup;
pub mod document;
pub mod error;
pub mod hashing;
pub mod playlist;
pub mod types;
