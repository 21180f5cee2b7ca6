use crate::coordinator::DEFAULT_UPDATE_INTERVAL;
use crate::youtube_api::DEFAULT_BASE_URL;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for one configured account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ids of the channels to follow, e.g. `UC_x5XG1OV2P6uZZ5FSM9Ttw`.
    pub channels: Vec<String>,
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Upper bound on simultaneous per-channel requests within one refresh.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL.as_secs()
}

fn default_max_concurrent_requests() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read configuration from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("load configuration {}", path.display()))
    }

    pub fn from_json(raw: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(raw).context("parse configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.channels.is_empty() {
            eyre::bail!("no channels configured");
        }
        if self.update_interval_secs == 0 {
            eyre::bail!("update_interval_secs must be greater than zero");
        }
        if self.max_concurrent_requests == 0 {
            eyre::bail!("max_concurrent_requests must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            eyre::bail!("request_timeout_secs must be greater than zero");
        }
        for channel in &self.channels {
            if !channel.starts_with("UC") {
                tracing::warn!(
                    channel = %channel,
                    "channel id does not start with UC, its uploads may not be found"
                );
            }
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the HTTP client used for API requests.
    pub fn http_client(&self) -> eyre::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .context("build HTTP client")
    }
}
