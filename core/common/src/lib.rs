//! Common utilities and types shared across snipsync modules.
//!
//! This module provides the error taxonomy and the small value types
//! (snippet snapshot, remote identity, visibility, access token) that every
//! backend and the sync engine agree on.

pub mod error;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use types::{AccessToken, RemoteId, Snippet, Visibility};
