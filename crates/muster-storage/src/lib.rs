//! # muster-storage
//!
//! SQLite persistence for the offline sync engine: the local mirror of server
//! entities and the durable pending mutation queue. One serialized write
//! connection, an optional read pool for file-backed databases, and
//! `PRAGMA user_version` migrations.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use muster_core::errors::{MusterError, StorageError};

/// Convert a string into a `MusterError::Storage(SqliteError)`.
pub(crate) fn to_storage_err(message: String) -> MusterError {
    StorageError::SqliteError { message }.into()
}
