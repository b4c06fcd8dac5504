// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "muster.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_SYNCHRONOUS: &str = "FULL";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 2;

// --- Sync ---
pub const DEFAULT_SNAPSHOT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_AUTO_SYNC_ON_RECONNECT: bool = true;

// --- Remote ---
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REMOTE_MAX_RETRIES: u32 = 2;
pub const DEFAULT_REMOTE_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_REMOTE_MAX_BACKOFF_MS: u64 = 10_000;

// --- Logging ---
pub const DEFAULT_LOG_FILTER: &str = "muster=info";
