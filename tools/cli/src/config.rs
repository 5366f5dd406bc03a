//! Configuration file for the snipsync CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use snipsync_storage::RemoteConfig;

const APP_DIR: &str = "snipsync";
const CONFIG_FILE: &str = "config.toml";
const SNIPPET_FILE: &str = "snippet.toml";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gitlab: RemoteConfig,
    #[serde(default)]
    pub gist: RemoteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Local file kept in sync.
    #[serde(default = "default_snippet_file")]
    pub snippet_file: PathBuf,
    /// Backend name: "gitlab", "gist" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            snippet_file: default_snippet_file(),
            backend: default_backend(),
        }
    }
}

fn default_snippet_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SNIPPET_FILE))
        .unwrap_or_else(|| PathBuf::from(SNIPPET_FILE))
}

fn default_backend() -> String {
    "gitlab".to_string()
}

impl Config {
    /// `<config dir>/snipsync/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the configuration directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Name of the section holding the selected backend's settings.
    pub fn remote_section(&self) -> &'static str {
        match self.general.backend.as_str() {
            "gist" => "gist",
            _ => "gitlab",
        }
    }

    /// Remote settings for the selected backend.
    pub fn remote(&self) -> &RemoteConfig {
        match self.remote_section() {
            "gist" => &self.gist,
            _ => &self.gitlab,
        }
    }

    /// Snippet file path with a leading `~` expanded.
    pub fn snippet_file(&self) -> PathBuf {
        expand_home(&self.general.snippet_file)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
