// src/config.rs
//! Client configuration: defaults, then an optional YAML file, then the
//! environment, then command line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::session::UserId;

pub const DEFAULT_CONFIG_FILE: &str = "notion-chat.yaml";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const API_PREFIX: &str = "/api/v1";

pub const ENV_BACKEND_URL: &str = "NOTION_CHAT_BACKEND_URL";
pub const ENV_USER_ID: &str = "NOTION_CHAT_USER_ID";
pub const ENV_LOG_DIR: &str = "NOTION_CHAT_LOG_DIR";
pub const ENV_DEBUG: &str = "DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    pub user_id: Option<String>,
    pub log_dir: PathBuf,
    pub debug: bool,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            user_id: None,
            log_dir: PathBuf::from("./logs"),
            debug: false,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ChatError::Config(format!("invalid config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Resolve file + environment. An explicit path must exist; the default
    /// file is only read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(user_id) = lookup(ENV_USER_ID).filter(|v| !v.trim().is_empty()) {
            self.user_id = Some(user_id);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|v| !v.trim().is_empty()) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            self.debug = debug == "true";
        }
    }

    pub fn with_overrides(mut self, backend_url: Option<String>, user_id: Option<String>) -> Self {
        if let Some(url) = backend_url {
            self.backend_url = url;
        }
        if let Some(user_id) = user_id {
            self.user_id = Some(user_id);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed backend base URL; only http(s) is accepted.
    pub fn backend_base(&self) -> Result<Url> {
        let url = Url::parse(self.backend_url.trim())
            .map_err(|e| ChatError::Config(format!("invalid backend url '{}': {}", self.backend_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ChatError::Config(format!("unsupported backend scheme '{}'", other))),
        }
    }

    pub fn require_user_id(&self) -> Result<UserId> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::new)
            .ok_or_else(|| ChatError::Config(format!("a user id is required (--user-id or {})", ENV_USER_ID)))
    }

    /// `ws(s)://<host>/api/v1/chat/ws?user_id=<id>`
    pub fn websocket_endpoint(&self, user_id: &UserId) -> Result<Url> {
        let mut url = self.backend_base()?;

        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ChatError::Config(format!("cannot derive websocket url from '{}'", self.backend_url)))?;

        let path = format!("{}{}/chat/ws", url.path().trim_end_matches('/'), API_PREFIX);
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("user_id", user_id.as_str());

        Ok(url)
    }
}
