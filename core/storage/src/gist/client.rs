//! GitHub gists API client.

use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use snipsync_common::{AccessToken, Error, Result};

use crate::transport::Transport;

/// Gist metadata and inline file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Files keyed by file name.
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

/// One file of a gist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
    /// Inline content; may be cut short for large files.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, Serialize)]
pub struct GistRequest<'a> {
    pub description: &'a str,
    /// Only honoured on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    pub files: HashMap<&'a str, GistFileContent<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GistFileContent<'a> {
    pub content: &'a str,
}

impl<'a> GistRequest<'a> {
    /// Request holding a single file.
    pub fn single_file(
        description: &'a str,
        public: Option<bool>,
        file_name: &'a str,
        content: &'a str,
    ) -> Self {
        Self {
            description,
            public,
            files: HashMap::from([(file_name, GistFileContent { content })]),
        }
    }
}

/// Thin client over the `/gists` endpoints.
#[derive(Debug, Clone)]
pub struct GistsApi {
    transport: Transport,
}

impl GistsApi {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: &str, token: &AccessToken, skip_tls_verify: bool) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(|_| {
            Error::Configuration("access_token contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        Ok(Self {
            transport: Transport::new(base_url, skip_tls_verify, headers)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Get a gist by ID.
    pub async fn get(&self, id: &str) -> Result<Gist> {
        let request = self.transport.http().get(self.transport.url(&format!("gists/{}", id)));
        self.transport.send_json(request, "Failed to get gist").await
    }

    /// Download a file from its raw URL.
    pub async fn raw(&self, raw_url: &str) -> Result<String> {
        let request = self.transport.http().get(raw_url);
        self.transport.send_text(request, "Failed to get gist file").await
    }

    /// Create a gist.
    pub async fn create(&self, body: &GistRequest<'_>) -> Result<Gist> {
        let request = self.transport.http().post(self.transport.url("gists")).json(body);
        self.transport.send_json(request, "Failed to create gist").await
    }

    /// Overwrite the files of a gist.
    pub async fn update(&self, id: &str, body: &GistRequest<'_>) -> Result<Gist> {
        let request = self
            .transport
            .http()
            .patch(self.transport.url(&format!("gists/{}", id)))
            .json(body);
        self.transport.send_json(request, "Failed to update gist").await
    }
}
