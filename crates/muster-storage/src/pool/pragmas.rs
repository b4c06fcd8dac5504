//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL journal, FULL sync by default so an enqueue is on disk before it
//! returns, busy_timeout, foreign_keys ON.

use rusqlite::Connection;

use muster_core::config::StorageConfig;
use muster_core::errors::MusterResult;

use crate::to_storage_err;

/// Apply write-side pragmas from the storage config.
///
/// Fails on a `synchronous` level other than FULL or NORMAL.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> MusterResult<()> {
    config.validate()?;
    let journal = if config.wal_mode { "WAL" } else { "DELETE" };
    conn.pragma_update(None, "journal_mode", journal)
        .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    conn.pragma_update(None, "synchronous", config.synchronous.as_str())
        .map_err(|e| to_storage_err(format!("synchronous: {e}")))?;
    conn.pragma_update(None, "busy_timeout", config.busy_timeout_ms)
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| to_storage_err(format!("foreign_keys: {e}")))?;
    Ok(())
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u32) -> MusterResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA query_only = ON;
        PRAGMA busy_timeout = {busy_timeout_ms};
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> MusterResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
