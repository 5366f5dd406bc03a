//! snipsync sync engine
//!
//! Moves the local snippet file to and from a [`SyncClient`]:
//! - Explicit upload and download
//! - Automatic direction from modification times (last writer wins)
//!
//! [`SyncClient`]: snipsync_storage::SyncClient

pub mod engine;

pub use engine::{decide_direction, SyncDirection, SyncEngine, SyncReport};
