//! Common types used throughout snipsync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, Result};

/// Identity of the remote object backing the snippet file.
///
/// `Unset` means no remote object exists yet and the next push must create
/// one. The payload type is backend-specific: GitLab snippets use numeric
/// ids, gists use opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteId<T> {
    Unset,
    Present(T),
}

impl<T> Default for RemoteId<T> {
    fn default() -> Self {
        RemoteId::Unset
    }
}

impl<T> RemoteId<T> {
    /// Whether a remote object is known.
    pub fn is_set(&self) -> bool {
        matches!(self, RemoteId::Present(_))
    }

    /// The identity, if set.
    pub fn get(&self) -> Option<&T> {
        match self {
            RemoteId::Unset => None,
            RemoteId::Present(id) => Some(id),
        }
    }
}

impl RemoteId<u64> {
    /// Parse a numeric identifier as it appears in configuration.
    ///
    /// An empty string or `0` yields `Unset`.
    ///
    /// # Errors
    /// - `Error::Configuration` if the value is not a non-negative integer
    pub fn parse_numeric(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(RemoteId::Unset);
        }

        match raw.parse::<u64>() {
            Ok(0) => Ok(RemoteId::Unset),
            Ok(id) => Ok(RemoteId::Present(id)),
            Err(e) => Err(Error::Configuration(format!(
                "Invalid snippet identifier '{}': {}",
                raw, e
            ))),
        }
    }
}

impl RemoteId<String> {
    /// Build an opaque identifier; blank input yields `Unset`.
    pub fn opaque(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            RemoteId::Unset
        } else {
            RemoteId::Present(raw.to_string())
        }
    }
}

impl<T: fmt::Display> fmt::Display for RemoteId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Unset => write!(f, "<unset>"),
            RemoteId::Present(id) => write!(f, "{}", id),
        }
    }
}

/// Snapshot of the remote snippet file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Full file content.
    pub content: String,
    /// Last modification time reported by the remote service.
    /// `None` when no remote object exists yet.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snippet {
    /// Snapshot of an existing remote object.
    pub fn new(content: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            updated_at: Some(updated_at),
        }
    }

    /// Snapshot returned before the first sync.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Visibility level of the remote object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "internal" => Ok(Visibility::Internal),
            "public" => Ok(Visibility::Public),
            other => Err(Error::InvalidInput(format!(
                "Unknown visibility '{}'. Use: private, internal, or public",
                other
            ))),
        }
    }
}

/// API access token that zeroizes on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}
