use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::constants::{DEFAULT_CONFIG_PATH, FEED_URL_ENV};
use crate::error::{ImporterError, Result};

/// Tunables read from the optional `importer.toml`
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub feed: FeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Everything the feed client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl FeedConfig {
    pub fn new(url: impl Into<String>, settings: &FeedSettings) -> Self {
        Self {
            url: url.into(),
            timeout_secs: settings.timeout_secs,
            retries: settings.retries,
            backoff_ms: settings.backoff_ms,
        }
    }

    /// Resolve the feed configuration from the environment and an optional TOML file.
    ///
    /// A missing file falls back to defaults; a missing feed URL is an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let settings = FileConfig::load(config_path)?.feed;
        let url = std::env::var(FEED_URL_ENV).map_err(|_| {
            ImporterError::Config(format!("{FEED_URL_ENV} must be set to the incident feed URL"))
        })?;
        Self::from_parts(&url, &settings)
    }

    fn from_parts(url: &str, settings: &FeedSettings) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ImporterError::Config(format!("{FEED_URL_ENV} is empty")));
        }
        Ok(Self::new(url, settings))
    }
}

impl FileConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        if !path.exists() {
            if config_path.is_some() {
                return Err(ImporterError::Config(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            debug!("No {} found, using default feed settings", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ImporterError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
