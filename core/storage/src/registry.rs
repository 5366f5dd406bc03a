//! Backend registry for resolving a sync client by name.

use std::collections::HashMap;

use snipsync_common::{Error, Result};

use crate::config::RemoteConfig;
use crate::memory::{MemoryClient, MemoryRemote};
use crate::provider::{ClientContext, SyncClient};

/// Factory function type for creating clients.
pub type BackendFactory =
    Box<dyn Fn(&RemoteConfig, &ClientContext) -> Result<Box<dyn SyncClient>> + Send + Sync>;

/// Registry for sync backend factories.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: BackendFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Backend '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Build a client for the named backend.
    ///
    /// # Errors
    /// - `Configuration` if the backend is unknown
    /// - Whatever the backend factory reports
    pub fn resolve(
        &self,
        name: &str,
        config: &RemoteConfig,
        ctx: &ClientContext,
    ) -> Result<Box<dyn SyncClient>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            let mut known = self.backends();
            known.sort();
            Error::Configuration(format!(
                "Unknown sync backend '{}'. Available: {}",
                name,
                known.join(", ")
            ))
        })?;
        factory(config, ctx)
    }

    /// Get list of registered backend names.
    pub fn backends(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in backends.
pub fn create_default_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();

    let gitlab: BackendFactory = Box::new(crate::gitlab::create_gitlab_client);
    let gist: BackendFactory = Box::new(crate::gist::create_gist_client);
    // Each resolve gets a fresh, empty remote.
    let memory: BackendFactory = Box::new(|config, _ctx| {
        Ok(Box::new(MemoryClient::new(MemoryRemote::new(), config)?) as Box<dyn SyncClient>)
    });

    registry.factories.insert("gitlab".to_string(), gitlab);
    registry.factories.insert("gist".to_string(), gist);
    registry.factories.insert("memory".to_string(), memory);

    registry
}
