//! HTTP transport shared by the hosted backends.

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use snipsync_common::{Error, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("snipsync/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one API base URL and TLS policy.
///
/// No request timeout is configured; a hung peer blocks the call.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
}

impl Transport {
    /// Build a transport for `endpoint`.
    ///
    /// `headers` are sent with every request (credentials go here).
    /// Setting `skip_tls_verify` disables certificate validation.
    ///
    /// # Errors
    /// - `Error::Transport` if the endpoint is not an http(s) URL or the
    ///   client cannot be built
    pub fn new(endpoint: &str, skip_tls_verify: bool, headers: HeaderMap) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Transport(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Transport(format!(
                "Unsupported URL scheme '{}' in {}",
                url.scheme(),
                endpoint
            )));
        }

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if skip_tls_verify {
            warn!("TLS certificate verification is disabled for {}", url);
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// The API base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Underlying HTTP client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Send a request and fail on any non-success status.
    ///
    /// `what` names the operation in error messages.
    pub async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| Error::Request {
            message: format!("{}: {}", what, e),
            status: e.status().map(|s| s.as_u16()),
        })?;

        let status = response.status();
        debug!("{} -> {}", what, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Request {
            message: format!("{}: {} - {}", what, status, body),
            status: Some(status.as_u16()),
        })
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = self.send(request, what).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("{}: failed to parse response: {}", what, e)))
    }

    /// Send a request and read its body as text.
    pub async fn send_text(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let response = self.send(request, what).await?;
        response.text().await.map_err(|e| Error::Request {
            message: format!("{}: failed to read response: {}", what, e),
            status: None,
        })
    }
}
