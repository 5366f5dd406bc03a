//! Remote snippet backends for snipsync.
//!
//! This module provides a trait-based interface over hosted snippet services
//! (GitLab snippets, GitHub gists) plus an in-memory backend, and a registry
//! that resolves a backend by name from configuration.
//!
//! # Design Principles
//! - Backend isolation: no service-specific logic outside its own module
//! - One remote object per client: a client is bound to one endpoint,
//!   credential and identity for its lifetime
//! - No retries: every failure is returned to the caller as-is
//! - Unified error semantics: not-found and mismatch are distinct from
//!   generic request failures

pub mod config;
pub mod credential;
pub mod gist;
pub mod gitlab;
pub mod memory;
pub mod progress;
pub mod provider;
pub mod registry;
pub mod transport;

pub use config::RemoteConfig;
pub use credential::{EnvSource, ProcessEnv};
pub use gist::GistClient;
pub use gitlab::GitLabClient;
pub use memory::{CallStats, MemoryClient, MemoryRemote};
pub use progress::{NoProgress, Progress, ProgressScope};
pub use provider::{ClientContext, PushOutcome, SyncClient};
pub use registry::{create_default_registry, BackendFactory, BackendRegistry};
