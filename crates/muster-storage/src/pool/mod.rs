//! Connection pool managing the write connection and optional readers.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use muster_core::config::StorageConfig;
use muster_core::errors::MusterResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` for in-memory databases, whose separate connections would each
    /// see an empty database.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> MusterResult<Self> {
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool with the writer only (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> MusterResult<Self> {
        let writer = WriteConnection::open_in_memory(config)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
        })
    }
}
