//! GitLab snippets API client.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use snipsync_common::{AccessToken, Error, Result, Visibility};

use crate::transport::Transport;

/// Snippet metadata from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabSnippet {
    /// Snippet ID.
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Name of the file held by the snippet.
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Body of a create or update request. Every field is always sent.
#[derive(Debug, Clone, Serialize)]
pub struct SnippetRequest<'a> {
    pub title: &'a str,
    pub file_name: &'a str,
    pub description: &'a str,
    pub content: &'a str,
    pub visibility: Visibility,
}

/// Thin client over the `/snippets` endpoints.
#[derive(Debug, Clone)]
pub struct SnippetsApi {
    transport: Transport,
}

impl SnippetsApi {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: &str, token: &AccessToken, skip_tls_verify: bool) -> Result<Self> {
        let mut auth = HeaderValue::from_str(token.expose()).map_err(|_| {
            Error::Configuration("access_token contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("PRIVATE-TOKEN", auth);

        Ok(Self {
            transport: Transport::new(base_url, skip_tls_verify, headers)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Get snippet metadata by ID.
    pub async fn get(&self, id: u64) -> Result<GitLabSnippet> {
        let request = self.transport.http().get(self.transport.url(&format!("snippets/{}", id)));
        self.transport.send_json(request, "Failed to get snippet").await
    }

    /// Get the raw snippet content.
    pub async fn content(&self, id: u64) -> Result<String> {
        let request = self
            .transport
            .http()
            .get(self.transport.url(&format!("snippets/{}/raw", id)));
        self.transport.send_text(request, "Failed to get snippet content").await
    }

    /// Create a snippet.
    pub async fn create(&self, body: &SnippetRequest<'_>) -> Result<GitLabSnippet> {
        let request = self.transport.http().post(self.transport.url("snippets")).json(body);
        self.transport.send_json(request, "Failed to create snippet").await
    }

    /// Overwrite a snippet.
    pub async fn update(&self, id: u64, body: &SnippetRequest<'_>) -> Result<GitLabSnippet> {
        let request = self
            .transport
            .http()
            .put(self.transport.url(&format!("snippets/{}", id)))
            .json(body);
        self.transport.send_json(request, "Failed to update snippet").await
    }
}
