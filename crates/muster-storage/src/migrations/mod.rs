//! Schema migrations using PRAGMA user_version.

pub mod v001_mirror_tables;
pub mod v002_pending_mutations;

use rusqlite::Connection;

use muster_core::errors::{MusterResult, StorageError};

type MigrationFn = fn(&Connection) -> MusterResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_mirror_tables::migrate),
    (2, v002_pending_mutations::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 2;

/// Run all pending migrations, each in its own transaction.
pub fn run_migrations(conn: &Connection) -> MusterResult<()> {
    let current = current_version(conn)?;

    for (version, migrate) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let failed = |reason: String| StorageError::MigrationFailed {
            version: *version,
            reason,
        };
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| failed(e.to_string()))?;
        migrate(&tx)?;
        tx.pragma_update(None, "user_version", version)
            .map_err(|e| failed(e.to_string()))?;
        tx.commit().map_err(|e| failed(e.to_string()))?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> MusterResult<u32> {
    let version = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(version)
}
