//! Sync client trait definition.

use async_trait::async_trait;
use std::sync::Arc;

use snipsync_common::{Result, Snippet};

use crate::credential::{EnvSource, ProcessEnv};
use crate::progress::{NoProgress, Progress};

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new remote object was created. The caller should persist `id`
    /// into configuration so later pushes update instead of creating again.
    Created { id: String },
    /// The existing remote object was overwritten.
    Updated { id: String },
}

impl PushOutcome {
    pub fn id(&self) -> &str {
        match self {
            PushOutcome::Created { id } | PushOutcome::Updated { id } => id,
        }
    }
}

/// Client for one remote snippet object.
///
/// A client is bound to a single endpoint, credential and identity. The
/// identity changes only when a push creates the remote object.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Get the backend name (e.g., "gitlab", "gist", "memory").
    fn name(&self) -> &str;

    /// Identity of the remote object, if one is known.
    fn remote_id(&self) -> Option<String>;

    /// Fetch the remote snapshot.
    ///
    /// # Postconditions
    /// - Returns an empty snapshot without any network I/O if the identity
    ///   is unset
    ///
    /// # Errors
    /// - `NotFound` if the identity names no remote object
    /// - `Mismatch` if the remote object holds a different file, or the
    ///   file is empty
    /// - `Request` on any other transport or service failure
    async fn fetch(&self) -> Result<Snippet>;

    /// Push the full local content.
    ///
    /// Creates the remote object if the identity is unset, otherwise
    /// overwrites it. Not idempotent while the identity is unset.
    ///
    /// # Postconditions
    /// - After `Created`, the client's identity is set to the new id
    async fn push(&mut self, content: &str) -> Result<PushOutcome>;
}

/// Process-level collaborators handed to client factories.
#[derive(Clone)]
pub struct ClientContext {
    /// Source for fallback credentials.
    pub env: Arc<dyn EnvSource>,
    /// Progress indication around network calls.
    pub progress: Arc<dyn Progress>,
}

impl ClientContext {
    pub fn new() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new()
    }
}
