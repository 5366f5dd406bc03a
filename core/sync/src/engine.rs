//! Sync engine for the snippet file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use snipsync_common::{Error, Result, Snippet};
use snipsync_storage::{PushOutcome, SyncClient};

/// Which way content moved during a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncDirection {
    Upload,
    Download,
    None,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub direction: SyncDirection,
    /// Set when an upload created the remote object. Must be persisted by
    /// the caller, or the next run creates another one.
    pub created_id: Option<String>,
}

impl SyncReport {
    fn nothing() -> Self {
        Self {
            direction: SyncDirection::None,
            created_id: None,
        }
    }
}

/// Decide the sync direction from the local modification time and the
/// remote snapshot.
///
/// `local_modified` is `None` when the snippet file does not exist.
pub fn decide_direction(local_modified: Option<DateTime<Utc>>, remote: &Snippet) -> SyncDirection {
    if remote.is_empty() {
        return match local_modified {
            Some(_) => SyncDirection::Upload,
            None => SyncDirection::None,
        };
    }

    // Whole seconds: filesystems differ in mtime precision.
    match (local_modified, remote.updated_at) {
        (None, _) => SyncDirection::Download,
        (Some(_), None) => SyncDirection::Upload,
        (Some(local), Some(remote)) => match local.timestamp().cmp(&remote.timestamp()) {
            Ordering::Greater => SyncDirection::Upload,
            Ordering::Less => SyncDirection::Download,
            Ordering::Equal => SyncDirection::None,
        },
    }
}

/// Synchronizes one snippet file with one remote object.
pub struct SyncEngine {
    client: Box<dyn SyncClient>,
    snippet_file: PathBuf,
}

impl SyncEngine {
    pub fn new(client: Box<dyn SyncClient>, snippet_file: impl Into<PathBuf>) -> Self {
        Self {
            client,
            snippet_file: snippet_file.into(),
        }
    }

    pub fn client(&self) -> &dyn SyncClient {
        self.client.as_ref()
    }

    pub fn snippet_file(&self) -> &Path {
        &self.snippet_file
    }

    /// Sync in whichever direction holds the older copy.
    pub async fn sync(&mut self) -> Result<SyncReport> {
        let remote = self.client.fetch().await?;
        let local_modified = self.local_modified().await?;

        let direction = decide_direction(local_modified, &remote);
        debug!(
            "Local modified {:?}, remote updated {:?}: {:?}",
            local_modified, remote.updated_at, direction
        );

        match direction {
            SyncDirection::Upload => self.upload().await,
            SyncDirection::Download => {
                self.write_local(&remote).await?;
                info!("Download success");
                Ok(SyncReport {
                    direction,
                    created_id: None,
                })
            }
            SyncDirection::None => {
                info!("Snippet file is up to date");
                Ok(SyncReport::nothing())
            }
        }
    }

    /// Push the local file, creating the remote object if needed.
    pub async fn upload(&mut self) -> Result<SyncReport> {
        let content = tokio::fs::read_to_string(&self.snippet_file)
            .await
            .map_err(|e| {
                Error::Io(e).context(format!(
                    "Failed to read snippet file {}",
                    self.snippet_file.display()
                ))
            })?;

        if content.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} is empty, nothing to upload",
                self.snippet_file.display()
            )));
        }

        let outcome = self.client.push(&content).await?;
        info!("Upload success");

        Ok(SyncReport {
            direction: SyncDirection::Upload,
            created_id: match outcome {
                PushOutcome::Created { id } => Some(id),
                PushOutcome::Updated { .. } => None,
            },
        })
    }

    /// Overwrite the local file with the remote copy.
    pub async fn download(&self) -> Result<SyncReport> {
        let remote = self.client.fetch().await?;

        if remote.is_empty() {
            warn!("No remote snippet to download yet");
            return Ok(SyncReport::nothing());
        }

        self.write_local(&remote).await?;
        info!("Download success");

        Ok(SyncReport {
            direction: SyncDirection::Download,
            created_id: None,
        })
    }

    async fn local_modified(&self) -> Result<Option<DateTime<Utc>>> {
        match tokio::fs::metadata(&self.snippet_file).await {
            Ok(metadata) => Ok(Some(DateTime::<Utc>::from(metadata.modified()?))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn write_local(&self, remote: &Snippet) -> Result<()> {
        if let Some(parent) = self.snippet_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&self.snippet_file, &remote.content)
            .await
            .map_err(|e| {
                Error::Io(e).context(format!(
                    "Failed to write snippet file {}",
                    self.snippet_file.display()
                ))
            })?;

        // Stamp the remote time so the next sync sees both sides as equal.
        if let Some(updated_at) = remote.updated_at {
            let path = self.snippet_file.clone();
            let modified = SystemTime::from(updated_at);
            tokio::task::spawn_blocking(move || {
                std::fs::OpenOptions::new()
                    .write(true)
                    .open(&path)?
                    .set_modified(modified)
            })
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        }

        Ok(())
    }
}
