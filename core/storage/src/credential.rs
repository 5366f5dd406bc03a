//! Access token resolution.

use std::collections::HashMap;

use snipsync_common::{AccessToken, Error, Result};

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolve an access token: the configured value first, then `env_var`.
///
/// Blank values count as absent.
pub fn resolve_access_token(
    configured: Option<&str>,
    env_var: &str,
    env: &dyn EnvSource,
) -> Option<AccessToken> {
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(AccessToken::new(token));
    }

    env.var(env_var)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(AccessToken::new)
}

/// Like [`resolve_access_token`], failing with instructions for the user.
///
/// # Errors
/// - `Error::Configuration` if neither source holds a token
pub fn require_access_token(
    configured: Option<&str>,
    env_var: &str,
    env: &dyn EnvSource,
    token_page: &str,
) -> Result<AccessToken> {
    resolve_access_token(configured, env_var, env).ok_or_else(|| {
        Error::Configuration(format!(
            "access_token is empty.\n\
             Go {} and create access_token.\n\
             Write access_token in config file or export ${}.",
            token_page, env_var
        ))
    })
}
