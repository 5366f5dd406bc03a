//! Backend configuration record.

use serde::{Deserialize, Serialize};

use snipsync_common::Visibility;

/// Default name of the file stored in the remote object.
pub const DEFAULT_FILE_NAME: &str = "snippet.toml";

/// Configuration for one remote snippet backend.
///
/// Read-only to the clients: a client copies what it needs at construction
/// time and never looks at the record again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API base URL. Falls back to the backend's public endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub skip_ssl: bool,
    /// Access token. Falls back to the backend's environment variable.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Identifier of the remote object; empty before the first push.
    #[serde(default)]
    pub id: Option<String>,
    /// Name the snippet file is stored under remotely.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Visibility of a created remote object.
    #[serde(default)]
    pub visibility: Visibility,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            skip_ssl: false,
            access_token: None,
            id: None,
            file_name: default_file_name(),
            visibility: Visibility::default(),
        }
    }
}

impl RemoteConfig {
    /// Configured URL, ignoring blank values.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Configured identifier, ignoring blank values.
    pub fn id(&self) -> &str {
        self.id.as_deref().map(str::trim).unwrap_or("")
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("skip_ssl", &self.skip_ssl)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("visibility", &self.visibility)
            .finish()
    }
}
