//! Feed configuration
//!
//! Loaded from YAML, then overridden from environment variables:
//!
//! ```yaml
//! base_url: "https://api.example.com/api"
//! fetch:
//!   timeout_ms: 5000
//! push:
//!   enabled: true
//!   stream_path: "/market/stream"
//!   connect_timeout_ms: 3000
//! poll:
//!   interval_ms: 10000
//! symbols:
//!   extended: [nasdaq]
//! ```

use super::poll_loop::DEFAULT_POLL_INTERVAL;
use crate::domain::{Symbol, SymbolSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ENV_BASE_URL: &str = "TICKER_BASE_URL";
pub const ENV_PUSH_ENABLED: &str = "TICKER_PUSH_ENABLED";
pub const ENV_POLL_INTERVAL_MS: &str = "TICKER_POLL_INTERVAL_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid environment override {name}: {value}")]
    InvalidEnv { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// API base; the snapshot endpoint is `<base_url>/market`
    pub base_url: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Set to false where no push transport is available
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    /// Maximum time to wait for the connection to open
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stream_path: default_stream_path(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolsConfig {
    /// Opt-in symbols on top of the core set
    #[serde(default)]
    pub extended: Vec<Symbol>,
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_stream_path() -> String {
    "/market/stream".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl FeedConfig {
    /// Configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fetch: FetchConfig::default(),
            push: PushConfig::default(),
            poll: PollConfig::default(),
            symbols: SymbolsConfig::default(),
        }
    }

    /// Load from a YAML file, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        info!(
            "[Ticker] Loaded feed config from {} (base: {}, push: {})",
            path.display(),
            config.base_url,
            config.push.enabled
        );
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }

        if let Some(value) = lookup(ENV_PUSH_ENABLED) {
            self.push.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_PUSH_ENABLED.to_string(),
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll.interval_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_POLL_INTERVAL_MS.to_string(),
                value: value.clone(),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::ValidationError("base_url is empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must be http or https: {}",
                base
            )));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0".into(),
            ));
        }
        if self.push.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "push.connect_timeout_ms must be > 0".into(),
            ));
        }
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll.interval_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Snapshot endpoint: `<base_url>/market`
    pub fn fetch_url(&self) -> String {
        format!("{}/market", self.base_url.trim().trim_end_matches('/'))
    }

    pub fn symbol_set(&self) -> SymbolSet {
        SymbolSet::with_extended(&self.symbols.extended)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.push.connect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}
