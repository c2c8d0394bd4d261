use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::staging::MediaKind;

/// Placeholder secret used when no `api_key` is configured.
pub const PLACEHOLDER_API_KEY: &str = "your_api_secret_here";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default, alias = "apiConfig")]
    pub api: ApiConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub staging: StagingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_key", alias = "apiKey")]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: default_api_key(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    /// Base URL of the session bridge. Without it sends are only logged.
    #[serde(default)]
    pub relay_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StagingConfig {
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_video_timeout_secs")]
    pub video_timeout_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            download_timeout_secs: default_download_timeout_secs(),
            video_timeout_secs: default_video_timeout_secs(),
        }
    }
}

impl StagingConfig {
    /// Directory downloads are written to (falls back to the system temp dir).
    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Download timeout for a given kind; videos get the longer budget.
    pub fn timeout_for(&self, kind: MediaKind) -> Duration {
        match kind {
            MediaKind::Video => Duration::from_secs(self.video_timeout_secs),
            MediaKind::Image | MediaKind::File => {
                Duration::from_secs(self.download_timeout_secs)
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

fn default_download_timeout_secs() -> u64 {
    30
}

fn default_video_timeout_secs() -> u64 {
    60
}

impl Config {
    /// `host:port` the API server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn uses_placeholder_key(&self) -> bool {
        self.api.api_key == PLACEHOLDER_API_KEY
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.api.api_key.is_empty() {
            anyhow::bail!("api.api_key must not be empty");
        }
        Ok(config)
    }
}
