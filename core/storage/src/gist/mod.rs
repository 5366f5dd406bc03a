//! GitHub gist backend for snipsync.
//!
//! The snippet file is stored as one file of a gist. Gist ids are opaque
//! strings; visibility maps onto the gist `public` flag at creation.

pub mod client;
pub mod provider;

pub use client::{Gist, GistFile, GistRequest, GistsApi};
pub use provider::{create_gist_client, GistClient, DEFAULT_GITHUB_URL, GITHUB_TOKEN_ENV};
