//! v002: pending_mutations.
//!
//! AUTOINCREMENT keeps `local_seq` from ever being reused, even after the
//! highest row is deleted and the database is reopened.

use rusqlite::Connection;

use muster_core::errors::MusterResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> MusterResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pending_mutations (
            local_seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_type      TEXT NOT NULL CHECK (entity_type IN ('member', 'meeting', 'attendance')),
            action           TEXT NOT NULL CHECK (action IN ('create', 'update', 'delete')),
            payload          TEXT NOT NULL,
            enqueued_at      TEXT NOT NULL,
            attempts         INTEGER NOT NULL DEFAULT 0,
            last_error       TEXT,
            last_attempt_at  TEXT
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
