use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Local SQLite store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Enable WAL journal mode.
    pub wal_mode: bool,
    /// `PRAGMA synchronous` level: "FULL" or "NORMAL".
    pub synchronous: String,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Number of read connections in the pool (file-backed mode only).
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            wal_mode: defaults::DEFAULT_WAL_MODE,
            synchronous: defaults::DEFAULT_SYNCHRONOUS.to_string(),
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
        }
    }
}

impl StorageConfig {
    /// Reject settings that would weaken queue durability or are unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "storage.db_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !matches!(self.synchronous.as_str(), "FULL" | "NORMAL") {
            return Err(ConfigError::ValidationFailed {
                field: "storage.synchronous".to_string(),
                message: format!("expected FULL or NORMAL, got {}", self.synchronous),
            });
        }
        Ok(())
    }
}
