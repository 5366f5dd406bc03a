//! GitHub gist sync client implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use snipsync_common::{Error, RemoteId, Result, Snippet, Visibility};

use crate::config::RemoteConfig;
use crate::credential::require_access_token;
use crate::progress::{Progress, ProgressScope};
use crate::provider::{ClientContext, PushOutcome, SyncClient};

use super::client::{GistRequest, GistsApi};

/// Environment variable holding the fallback access token.
pub const GITHUB_TOKEN_ENV: &str = "SNIPSYNC_GITHUB_ACCESS_TOKEN";
/// API base URL used when none is configured.
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

const TOKEN_PAGE: &str = "https://github.com/settings/tokens";
const GIST_DESCRIPTION: &str = "Snippet file generated by snipsync";

/// Sync client backed by a single gist.
pub struct GistClient {
    api: GistsApi,
    id: RemoteId<String>,
    file_name: String,
    visibility: Visibility,
    progress: Arc<dyn Progress>,
}

impl GistClient {
    /// Create a client from configuration.
    ///
    /// No network I/O happens here.
    pub fn new(config: &RemoteConfig, ctx: &ClientContext) -> Result<Self> {
        let token = require_access_token(
            config.access_token.as_deref(),
            GITHUB_TOKEN_ENV,
            ctx.env.as_ref(),
            TOKEN_PAGE,
        )?;

        let url = match config.url() {
            Some(url) => {
                info!("Using GitHub API at {}", url);
                url
            }
            None => DEFAULT_GITHUB_URL,
        };

        let api = GistsApi::new(url, &token, config.skip_ssl)
            .map_err(|e| e.context("Failed to create GitHub client"))?;

        Ok(Self {
            api,
            id: RemoteId::opaque(config.id()),
            file_name: config.file_name.clone(),
            visibility: config.visibility,
            progress: ctx.progress.clone(),
        })
    }

    pub fn id(&self) -> &RemoteId<String> {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    async fn create(&self, content: &str) -> Result<String> {
        let _progress = ProgressScope::start(self.progress.as_ref(), "Creating Gist...");

        let public = self.visibility == Visibility::Public;
        let body =
            GistRequest::single_file(GIST_DESCRIPTION, Some(public), &self.file_name, content);
        let created = self.api.create(&body).await?;
        debug!("Created Gist {}", created.id);
        Ok(created.id)
    }

    async fn update(&self, id: &str, content: &str) -> Result<()> {
        let _progress = ProgressScope::start(self.progress.as_ref(), "Updating Gist...");

        let body = GistRequest::single_file(GIST_DESCRIPTION, None, &self.file_name, content);
        self.api
            .update(id, &body)
            .await
            .map_err(|e| not_found(e, id))?;
        debug!("Updated Gist {}", id);
        Ok(())
    }
}

fn not_found(err: Error, id: &str) -> Error {
    match err.status() {
        Some(404) => Error::NotFound { id: id.to_string() },
        _ => err,
    }
}

fn classify(err: Error, id: &str, context: &str) -> Error {
    match not_found(err, id) {
        err @ Error::NotFound { .. } => err,
        err => err.context(format!("{} (ID: {})", context, id)),
    }
}

#[async_trait]
impl SyncClient for GistClient {
    fn name(&self) -> &str {
        "gist"
    }

    fn remote_id(&self) -> Option<String> {
        self.id.get().cloned()
    }

    async fn fetch(&self) -> Result<Snippet> {
        let id = match &self.id {
            RemoteId::Unset => return Ok(Snippet::empty()),
            RemoteId::Present(id) => id.as_str(),
        };

        let _progress = ProgressScope::start(self.progress.as_ref(), "Getting Gist...");

        let gist = self
            .api
            .get(id)
            .await
            .map_err(|e| classify(e, id, "Failed to get Gist"))?;

        let file = gist.files.get(&self.file_name).ok_or_else(|| {
            Error::Mismatch(format!(
                "No snippet file '{}' in Gist (ID: {})",
                self.file_name, id
            ))
        })?;

        let content = match (&file.content, &file.raw_url) {
            (Some(content), _) if !file.truncated => content.clone(),
            (_, Some(raw_url)) => self
                .api
                .raw(raw_url)
                .await
                .map_err(|e| classify(e, id, "Failed to get Gist content"))?,
            // Inline copy is partial and there is nothing to complete it from.
            _ if file.truncated => {
                return Err(Error::Mismatch(format!(
                    "{} is truncated in Gist (ID: {}) and has no raw URL",
                    self.file_name, id
                )));
            }
            _ => String::new(),
        };

        if content.is_empty() {
            return Err(Error::Mismatch(format!("{} is empty", self.file_name)));
        }

        Ok(Snippet {
            content,
            updated_at: gist.updated_at,
        })
    }

    async fn push(&mut self, content: &str) -> Result<PushOutcome> {
        match &self.id {
            RemoteId::Unset => {
                let id = self
                    .create(content)
                    .await
                    .map_err(|e| e.context("Failed to create Gist"))?;

                info!("Gist ID: {}", id);
                self.id = RemoteId::Present(id.clone());
                Ok(PushOutcome::Created { id })
            }
            RemoteId::Present(id) => {
                self.update(id, content)
                    .await
                    .map_err(|e| e.context(format!("Failed to update Gist (ID: {})", id)))?;
                Ok(PushOutcome::Updated { id: id.clone() })
            }
        }
    }
}

/// Create a gist client from configuration (for use with registry).
pub fn create_gist_client(
    config: &RemoteConfig,
    ctx: &ClientContext,
) -> Result<Box<dyn SyncClient>> {
    Ok(Box::new(GistClient::new(config, ctx)?))
}
