//! Configuration: compiled defaults, TOML file, `MUSTER_*` environment overrides.

pub mod defaults;
pub mod remote_config;
pub mod storage_config;
pub mod sync_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use remote_config::RemoteConfig;
pub use storage_config::StorageConfig;
pub use sync_config::SyncConfig;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`MUSTER_*`)
/// 2. Config file passed to [`MusterConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MusterConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

impl MusterConfig {
    /// Load configuration from an optional TOML file, then apply the process
    /// environment and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `MUSTER_*` overrides using the given variable lookup.
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MUSTER_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = lookup("MUSTER_SYNCHRONOUS") {
            self.storage.synchronous = v.to_ascii_uppercase();
        }
        if let Some(v) = lookup("MUSTER_REMOTE_URL") {
            self.remote.base_url = v;
        }
        if let Some(v) = lookup("MUSTER_REMOTE_TOKEN") {
            self.remote.bearer_token = Some(v);
        }
        if let Some(v) = lookup("MUSTER_GROUP_ID") {
            self.sync.group_id = if v.is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("MUSTER_SNAPSHOT_WINDOW_DAYS") {
            match v.parse() {
                Ok(days) => self.sync.snapshot_window_days = days,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid MUSTER_SNAPSHOT_WINDOW_DAYS"),
            }
        }
        if let Some(v) = lookup("MUSTER_AUTO_SYNC") {
            match v.parse() {
                Ok(flag) => self.sync.auto_sync_on_reconnect = flag,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid MUSTER_AUTO_SYNC"),
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        if self.sync.snapshot_window_days == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "sync.snapshot_window_days".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "remote.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.remote.initial_backoff_ms > self.remote.max_backoff_ms {
            return Err(ConfigError::ValidationFailed {
                field: "remote.initial_backoff_ms".to_string(),
                message: "must not exceed remote.max_backoff_ms".to_string(),
            });
        }
        Ok(())
    }
}
