//! GitLab snippet backend for snipsync.
//!
//! The snippet file is stored as a personal GitLab snippet:
//! - Access token from configuration or `SNIPSYNC_GITLAB_ACCESS_TOKEN`
//! - Self-hosted instances via a custom API URL
//! - Numeric snippet ids

pub mod client;
pub mod provider;

pub use client::{GitLabSnippet, SnippetRequest, SnippetsApi};
pub use provider::{create_gitlab_client, GitLabClient, DEFAULT_GITLAB_URL, GITLAB_TOKEN_ENV};
