//! GitLab sync client implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use snipsync_common::{Error, RemoteId, Result, Snippet, Visibility};

use crate::config::RemoteConfig;
use crate::credential::require_access_token;
use crate::progress::{Progress, ProgressScope};
use crate::provider::{ClientContext, PushOutcome, SyncClient};

use super::client::{SnippetRequest, SnippetsApi};

/// Environment variable holding the fallback access token.
pub const GITLAB_TOKEN_ENV: &str = "SNIPSYNC_GITLAB_ACCESS_TOKEN";
/// API base URL used when none is configured.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com/api/v4";

const TOKEN_PAGE: &str = "https://gitlab.com/-/user_settings/personal_access_tokens";
const SNIPPET_TITLE: &str = "snipsync-snippet";
const SNIPPET_DESCRIPTION: &str = "Snippet file generated by snipsync";

/// Sync client backed by a single GitLab snippet.
pub struct GitLabClient {
    api: SnippetsApi,
    id: RemoteId<u64>,
    file_name: String,
    visibility: Visibility,
    progress: Arc<dyn Progress>,
}

impl GitLabClient {
    /// Create a client from configuration.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    /// - `Configuration` if no access token is available or the snippet id
    ///   is not a number
    /// - `Transport` if the API URL is malformed
    pub fn new(config: &RemoteConfig, ctx: &ClientContext) -> Result<Self> {
        let token = require_access_token(
            config.access_token.as_deref(),
            GITLAB_TOKEN_ENV,
            ctx.env.as_ref(),
            TOKEN_PAGE,
        )?;

        let url = match config.url() {
            Some(url) => {
                info!("Using GitLab API at {}", url);
                url
            }
            None => DEFAULT_GITLAB_URL,
        };

        let api = SnippetsApi::new(url, &token, config.skip_ssl)
            .map_err(|e| e.context("Failed to create GitLab client"))?;

        let id = RemoteId::parse_numeric(config.id())?;

        Ok(Self {
            api,
            id,
            file_name: config.file_name.clone(),
            visibility: config.visibility,
            progress: ctx.progress.clone(),
        })
    }

    /// Identity of the backing snippet.
    pub fn id(&self) -> &RemoteId<u64> {
        &self.id
    }

    /// Effective API base URL.
    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    fn request<'a>(&'a self, content: &'a str) -> SnippetRequest<'a> {
        SnippetRequest {
            title: SNIPPET_TITLE,
            file_name: &self.file_name,
            description: SNIPPET_DESCRIPTION,
            content,
            visibility: self.visibility,
        }
    }

    async fn create(&self, content: &str) -> Result<u64> {
        let _progress =
            ProgressScope::start(self.progress.as_ref(), "Creating GitLab Snippet...");

        let created = self.api.create(&self.request(content)).await?;
        debug!("Created GitLab Snippet {}", created.id);
        Ok(created.id)
    }

    async fn update(&self, id: u64, content: &str) -> Result<()> {
        let _progress =
            ProgressScope::start(self.progress.as_ref(), "Updating GitLab Snippet...");

        self.api
            .update(id, &self.request(content))
            .await
            .map_err(|e| not_found(e, id))?;
        debug!("Updated GitLab Snippet {}", id);
        Ok(())
    }
}

/// Turn a 404 into `NotFound`.
fn not_found(err: Error, id: u64) -> Error {
    match err.status() {
        Some(404) => Error::NotFound { id: id.to_string() },
        _ => err,
    }
}

/// Turn a 404 into `NotFound`, annotate anything else.
fn classify(err: Error, id: u64, context: &str) -> Error {
    match not_found(err, id) {
        err @ Error::NotFound { .. } => err,
        err => err.context(format!("{} (ID: {})", context, id)),
    }
}

#[async_trait]
impl SyncClient for GitLabClient {
    fn name(&self) -> &str {
        "gitlab"
    }

    fn remote_id(&self) -> Option<String> {
        self.id.get().map(u64::to_string)
    }

    async fn fetch(&self) -> Result<Snippet> {
        let id = match self.id {
            RemoteId::Unset => return Ok(Snippet::empty()),
            RemoteId::Present(id) => id,
        };

        let _progress =
            ProgressScope::start(self.progress.as_ref(), "Getting GitLab Snippet...");

        let snippet = self
            .api
            .get(id)
            .await
            .map_err(|e| classify(e, id, "Failed to get GitLab Snippet"))?;

        if snippet.file_name != self.file_name {
            return Err(Error::Mismatch(format!(
                "No snippet file '{}' in GitLab Snippet (ID: {}), found '{}'",
                self.file_name, id, snippet.file_name
            )));
        }

        let content = self
            .api
            .content(id)
            .await
            .map_err(|e| classify(e, id, "Failed to get GitLab Snippet content"))?;

        if content.is_empty() {
            return Err(Error::Mismatch(format!("{} is empty", self.file_name)));
        }

        Ok(Snippet {
            content,
            updated_at: snippet.updated_at,
        })
    }

    async fn push(&mut self, content: &str) -> Result<PushOutcome> {
        match self.id {
            RemoteId::Unset => {
                let id = self
                    .create(content)
                    .await
                    .map_err(|e| e.context("Failed to create GitLab Snippet"))?;

                info!("GitLab Snippet ID: {}", id);
                self.id = RemoteId::Present(id);
                Ok(PushOutcome::Created { id: id.to_string() })
            }
            RemoteId::Present(id) => {
                self.update(id, content).await.map_err(|e| {
                    e.context(format!("Failed to update GitLab Snippet (ID: {})", id))
                })?;
                Ok(PushOutcome::Updated { id: id.to_string() })
            }
        }
    }
}

/// Create a GitLab client from configuration (for use with registry).
pub fn create_gitlab_client(
    config: &RemoteConfig,
    ctx: &ClientContext,
) -> Result<Box<dyn SyncClient>> {
    Ok(Box::new(GitLabClient::new(config, ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipsync_common::ErrorKind;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wiremock::matchers::{any, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn test_config(url: &str, id: Option<&str>) -> RemoteConfig {
        RemoteConfig {
            url: Some(url.to_string()),
            access_token: Some("glpat-config".to_string()),
            id: id.map(str::to_string),
            file_name: "snippet.toml".to_string(),
            ..Default::default()
        }
    }

    fn no_env() -> ClientContext {
        ClientContext::new().with_env(Arc::new(HashMap::<String, String>::new()))
    }

    fn snippet_json(id: u64, file_name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "snipsync-snippet",
            "file_name": file_name,
            "updated_at": "2024-03-01T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_fetch_unset_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = GitLabClient::new(&test_config(&server.uri(), None), &no_env()).unwrap();
        let snippet = client.fetch().await.unwrap();

        assert!(snippet.is_empty());
        assert!(snippet.updated_at.is_none());
        assert_eq!(client.remote_id(), None);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snippet_json(5, "snippet.toml")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/5/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[[snippets]]\n"))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&test_config(&server.uri(), Some("5")), &no_env()).unwrap();
        let snippet = client.fetch().await.unwrap();

        assert_eq!(snippet.content, "[[snippets]]\n");
        assert_eq!(
            snippet.updated_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn test_fetch_not_found_names_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = test_config(&server.uri(), Some("404"));
        let client = GitLabClient::new(&config, &no_env()).unwrap();
        let err = client.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&test_config(&server.uri(), Some("5")), &no_env()).unwrap();
        let err = client.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.to_string(), "Failed to get GitLab Snippet (ID: 5)");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_fetch_filename_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snippet_json(5, "other.txt")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/5/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_string("foreign"))
            .expect(0)
            .mount(&server)
            .await;

        let client = GitLabClient::new(&test_config(&server.uri(), Some("5")), &no_env()).unwrap();
        let err = client.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mismatch);
    }

    #[tokio::test]
    async fn test_fetch_empty_content_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snippet_json(5, "snippet.toml")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/5/raw"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = GitLabClient::new(&test_config(&server.uri(), Some("5")), &no_env()).unwrap();
        let err = client.fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mismatch);
        assert!(err.to_string().contains("snippet.toml is empty"));
    }

    #[tokio::test]
    async fn test_push_creates_then_updates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/snippets"))
            .and(body_partial_json(serde_json::json!({
                "title": SNIPPET_TITLE,
                "file_name": "snippet.toml",
                "description": SNIPPET_DESCRIPTION,
                "content": "first",
                "visibility": "private"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(snippet_json(77, "snippet.toml")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/snippets/77"))
            .and(body_partial_json(serde_json::json!({
                "title": SNIPPET_TITLE,
                "description": SNIPPET_DESCRIPTION,
                "content": "second"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(snippet_json(77, "snippet.toml")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut client = GitLabClient::new(&test_config(&server.uri(), None), &no_env()).unwrap();

        let outcome = client.push("first").await.unwrap();
        assert_eq!(outcome, PushOutcome::Created { id: "77".to_string() });
        assert_eq!(client.id(), &RemoteId::Present(77));

        let outcome = client.push("second").await.unwrap();
        assert_eq!(outcome, PushOutcome::Updated { id: "77".to_string() });
    }

    #[tokio::test]
    async fn test_failed_create_leaves_identity_unset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/snippets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut client = GitLabClient::new(&test_config(&server.uri(), None), &no_env()).unwrap();
        let err = client.push("content").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to create GitLab Snippet");
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(client.id(), &RemoteId::Unset);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/snippets/12"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = test_config(&server.uri(), Some("12"));
        let mut client = GitLabClient::new(&config, &no_env()).unwrap();
        let err = client.push("content").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to update GitLab Snippet (ID: 12)");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err.root(), Error::NotFound { id } if id == "12"));
    }

    #[tokio::test]
    async fn test_update_failure_has_single_context() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/snippets/12"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri(), Some("12"));
        let mut client = GitLabClient::new(&config, &no_env()).unwrap();
        let err = client.push("content").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to update GitLab Snippet (ID: 12)");
        assert!(matches!(
            &err,
            Error::Context { source, .. } if matches!(**source, Error::Request { .. })
        ));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_push_then_fetch_round_trip() {
        let server = MockServer::start().await;
        let stored: Arc<Mutex<String>> = Arc::default();

        let on_create = stored.clone();
        Mock::given(method("POST"))
            .and(path("/snippets"))
            .respond_with(move |request: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
                *on_create.lock().unwrap() = body["content"].as_str().unwrap().to_string();
                ResponseTemplate::new(201).set_body_json(snippet_json(31, "snippet.toml"))
            })
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/31"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(snippet_json(31, "snippet.toml")),
            )
            .mount(&server)
            .await;
        let on_read = stored.clone();
        Mock::given(method("GET"))
            .and(path("/snippets/31/raw"))
            .respond_with(move |_: &Request| {
                ResponseTemplate::new(200).set_body_string(on_read.lock().unwrap().clone())
            })
            .mount(&server)
            .await;

        let mut client = GitLabClient::new(&test_config(&server.uri(), None), &no_env()).unwrap();
        let content = "[[snippets]]\n  command = \"echo hi\"\n";

        client.push(content).await.unwrap();
        assert_eq!(client.fetch().await.unwrap().content, content);
    }

    #[tokio::test]
    async fn test_config_token_preferred_over_env() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .and(header("PRIVATE-TOKEN", "glpat-config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snippet_json(5, "snippet.toml")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/5/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x"))
            .mount(&server)
            .await;

        let env: HashMap<String, String> =
            HashMap::from([(GITLAB_TOKEN_ENV.to_string(), "glpat-env".to_string())]);
        let ctx = ClientContext::new().with_env(Arc::new(env));

        let client = GitLabClient::new(&test_config(&server.uri(), Some("5")), &ctx).unwrap();
        client.fetch().await.unwrap();
    }

    #[tokio::test]
    async fn test_env_token_used_when_not_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippets/5"))
            .and(header("PRIVATE-TOKEN", "glpat-env"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snippet_json(5, "snippet.toml")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/snippets/5/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x"))
            .mount(&server)
            .await;

        let env: HashMap<String, String> =
            HashMap::from([(GITLAB_TOKEN_ENV.to_string(), "glpat-env".to_string())]);
        let ctx = ClientContext::new().with_env(Arc::new(env));

        let mut config = test_config(&server.uri(), Some("5"));
        config.access_token = None;

        let client = GitLabClient::new(&config, &ctx).unwrap();
        client.fetch().await.unwrap();
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let mut config = test_config("https://gitlab.example.com/api/v4", None);
        config.access_token = None;

        let err = GitLabClient::new(&config, &no_env()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(GITLAB_TOKEN_ENV));
    }

    #[test]
    fn test_invalid_id_is_configuration_error() {
        let config = test_config("https://gitlab.example.com/api/v4", Some("abc"));
        let err = GitLabClient::new(&config, &no_env()).err().unwrap();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("Invalid snippet identifier"));
    }

    #[test]
    fn test_malformed_url_is_transport_error() {
        let config = test_config("::not a url::", None);
        let err = GitLabClient::new(&config, &no_env()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_default_url() {
        let config = RemoteConfig {
            access_token: Some("glpat".to_string()),
            ..Default::default()
        };
        let client = GitLabClient::new(&config, &no_env()).unwrap();
        assert_eq!(client.base_url(), DEFAULT_GITLAB_URL);
        assert_eq!(client.name(), "gitlab");
    }

    #[test]
    fn test_factory() {
        let config = RemoteConfig {
            access_token: Some("glpat".to_string()),
            id: Some("31".to_string()),
            ..Default::default()
        };
        let client = create_gitlab_client(&config, &no_env()).unwrap();
        assert_eq!(client.remote_id().as_deref(), Some("31"));
    }
}
