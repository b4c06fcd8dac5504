use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// HTTP remote store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the membership API.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Transport-level retries for 5xx and connection failures.
    pub max_retries: u32,
    /// First retry delay; doubles on each attempt.
    pub initial_backoff_ms: u64,
    /// Upper bound for the retry delay.
    pub max_backoff_ms: u64,
    /// Bearer token issued by the session layer.
    pub bearer_token: Option<String>,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: defaults::DEFAULT_REMOTE_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_REMOTE_MAX_RETRIES,
            initial_backoff_ms: defaults::DEFAULT_REMOTE_INITIAL_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_REMOTE_MAX_BACKOFF_MS,
            bearer_token: None,
        }
    }
}
