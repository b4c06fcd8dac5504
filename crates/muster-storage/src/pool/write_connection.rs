//! Single write connection behind `tokio::sync::Mutex`.
//! Serialized writes; migrations run before the connection is shared.

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use muster_core::config::StorageConfig;
use muster_core::errors::MusterResult;

use super::pragmas::apply_pragmas;
use crate::migrations::run_migrations;
use crate::to_storage_err;

/// A single write connection protected by an async mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open the write connection, apply pragmas, and migrate the schema.
    pub fn open(path: &Path, config: &StorageConfig) -> MusterResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::prepare(conn, config)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> MusterResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::prepare(conn, config)
    }

    fn prepare(conn: Connection, config: &StorageConfig) -> MusterResult<Self> {
        apply_pragmas(&conn, config)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> MusterResult<T>
    where
        F: FnOnce(&Connection) -> MusterResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }
}
