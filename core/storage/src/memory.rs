//! In-memory sync backend for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use snipsync_common::{Error, RemoteId, Result, Snippet, Visibility};

use crate::config::RemoteConfig;
use crate::provider::{PushOutcome, SyncClient};

/// A stored remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub title: String,
    pub file_name: String,
    pub description: String,
    pub content: String,
    pub visibility: Visibility,
    pub updated_at: DateTime<Utc>,
}

/// Number of calls made against a [`MemoryRemote`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub creates: usize,
    pub updates: usize,
    pub gets: usize,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<u64, StoredObject>,
    next_id: u64,
    stats: CallStats,
}

/// Shared in-memory stand-in for a snippet service.
///
/// Clones share the same storage, so several clients can observe each
/// other's pushes. All data is lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<State>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store an object directly, bypassing call accounting.
    pub fn insert(&self, file_name: &str, content: &str) -> u64 {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.objects.insert(
            id,
            StoredObject {
                title: String::new(),
                file_name: file_name.to_string(),
                description: String::new(),
                content: content.to_string(),
                visibility: Visibility::Private,
                updated_at: Utc::now(),
            },
        );
        id
    }

    /// Snapshot of a stored object.
    pub fn object(&self, id: u64) -> Option<StoredObject> {
        self.lock().objects.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CallStats {
        self.lock().stats
    }

    fn get(&self, id: u64) -> Result<StoredObject> {
        let mut state = self.lock();
        state.stats.gets += 1;
        state
            .objects
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    fn create(&self, object: StoredObject) -> u64 {
        let mut state = self.lock();
        state.stats.creates += 1;
        state.next_id += 1;
        let id = state.next_id;
        state.objects.insert(id, object);
        id
    }

    fn update(&self, id: u64, object: StoredObject) -> Result<()> {
        let mut state = self.lock();
        state.stats.updates += 1;
        match state.objects.get_mut(&id) {
            Some(existing) => {
                *existing = object;
                Ok(())
            }
            None => Err(Error::NotFound { id: id.to_string() }),
        }
    }
}

/// Sync client over a [`MemoryRemote`].
pub struct MemoryClient {
    remote: MemoryRemote,
    id: RemoteId<u64>,
    file_name: String,
    visibility: Visibility,
}

impl MemoryClient {
    pub fn new(remote: MemoryRemote, config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            remote,
            id: RemoteId::parse_numeric(config.id())?,
            file_name: config.file_name.clone(),
            visibility: config.visibility,
        })
    }

    pub fn id(&self) -> &RemoteId<u64> {
        &self.id
    }

    fn object(&self, content: &str) -> StoredObject {
        StoredObject {
            title: "snipsync-snippet".to_string(),
            file_name: self.file_name.clone(),
            description: "Snippet file generated by snipsync".to_string(),
            content: content.to_string(),
            visibility: self.visibility,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SyncClient for MemoryClient {
    fn name(&self) -> &str {
        "memory"
    }

    fn remote_id(&self) -> Option<String> {
        self.id.get().map(u64::to_string)
    }

    async fn fetch(&self) -> Result<Snippet> {
        let id = match self.id {
            RemoteId::Unset => return Ok(Snippet::empty()),
            RemoteId::Present(id) => id,
        };

        let object = self.remote.get(id)?;

        if object.file_name != self.file_name {
            return Err(Error::Mismatch(format!(
                "No snippet file '{}' in remote object (ID: {})",
                self.file_name, id
            )));
        }

        if object.content.is_empty() {
            return Err(Error::Mismatch(format!("{} is empty", self.file_name)));
        }

        Ok(Snippet::new(object.content, object.updated_at))
    }

    async fn push(&mut self, content: &str) -> Result<PushOutcome> {
        match self.id {
            RemoteId::Unset => {
                let id = self.remote.create(self.object(content));
                self.id = RemoteId::Present(id);
                Ok(PushOutcome::Created { id: id.to_string() })
            }
            RemoteId::Present(id) => {
                self.remote
                    .update(id, self.object(content))
                    .map_err(|e| e.context("Failed to update remote object"))?;
                Ok(PushOutcome::Updated { id: id.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipsync_common::ErrorKind;

    fn config(id: Option<String>) -> RemoteConfig {
        RemoteConfig {
            id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unset_fetch_touches_nothing() {
        let remote = MemoryRemote::new();
        let client = MemoryClient::new(remote.clone(), &config(None)).unwrap();

        assert_eq!(client.fetch().await.unwrap(), Snippet::empty());
        assert_eq!(remote.stats(), CallStats::default());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let remote = MemoryRemote::new();
        let mut writer = MemoryClient::new(remote.clone(), &config(None)).unwrap();

        let outcome = writer.push("[[snippets]]\ncommand = \"ls\"\n").await.unwrap();

        let reader =
            MemoryClient::new(remote.clone(), &config(Some(outcome.id().to_string()))).unwrap();
        let snippet = reader.fetch().await.unwrap();

        assert_eq!(snippet.content, "[[snippets]]\ncommand = \"ls\"\n");
        assert!(snippet.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_create_once_then_update() {
        let remote = MemoryRemote::new();
        let mut client = MemoryClient::new(remote.clone(), &config(None)).unwrap();

        let first = client.push("one").await.unwrap();
        let second = client.push("two").await.unwrap();

        assert!(matches!(first, PushOutcome::Created { .. }));
        assert!(matches!(second, PushOutcome::Updated { .. }));
        assert_eq!(first.id(), second.id());

        let stats = remote.stats();
        assert_eq!(stats.creates, 1);
        assert_eq!(stats.updates, 1);
        assert_eq!(remote.len(), 1);
        assert_eq!(client.fetch().await.unwrap().content, "two");
    }

    #[tokio::test]
    async fn test_update_overwrites_metadata() {
        let remote = MemoryRemote::new();
        let id = remote.insert("snippet.toml", "old");
        let mut client = MemoryClient::new(remote.clone(), &config(Some(id.to_string()))).unwrap();

        client.push("new").await.unwrap();

        let object = remote.object(id).unwrap();
        assert_eq!(object.title, "snipsync-snippet");
        assert_eq!(object.description, "Snippet file generated by snipsync");
        assert_eq!(object.content, "new");
    }

    #[tokio::test]
    async fn test_filename_mismatch() {
        let remote = MemoryRemote::new();
        let id = remote.insert("other.txt", "foreign");
        let client = MemoryClient::new(remote, &config(Some(id.to_string()))).unwrap();

        let err = client.fetch().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mismatch);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let remote = MemoryRemote::new();
        let id = remote.insert("snippet.toml", "");
        let client = MemoryClient::new(remote, &config(Some(id.to_string()))).unwrap();

        assert!(client.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_not_found() {
        let remote = MemoryRemote::new();
        let mut client = MemoryClient::new(remote, &config(Some("99".to_string()))).unwrap();

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref id } if id == "99"));

        let err = client.push("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
