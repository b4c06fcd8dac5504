//! Pending mutation queue: append, ordered scan, single delete, count.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use muster_core::constants::MAX_STORED_ERROR_LEN;
use muster_core::errors::{MusterResult, StorageError};
use muster_core::models::{EntityType, MutationAction, PendingMutation};

use crate::to_storage_err;

const SELECT_COLUMNS: &str =
    "local_seq, entity_type, action, payload, enqueued_at, attempts, last_error";

/// Append one mutation. Committed before returning; yields the new `local_seq`.
pub fn enqueue(
    conn: &Connection,
    entity_type: EntityType,
    action: MutationAction,
    payload: &serde_json::Value,
    enqueued_at: DateTime<Utc>,
) -> MusterResult<i64> {
    let payload_json =
        serde_json::to_string(payload).map_err(|e| to_storage_err(e.to_string()))?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("enqueue begin: {e}")))?;
    tx.execute(
        "INSERT INTO pending_mutations (entity_type, action, payload, enqueued_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entity_type.as_str(),
            action.as_str(),
            payload_json,
            enqueued_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    let local_seq = tx.last_insert_rowid();
    tx.commit()
        .map_err(|e| to_storage_err(format!("enqueue commit: {e}")))?;
    Ok(local_seq)
}

/// All pending mutations, `local_seq` ascending. Does not remove anything.
pub fn drain(conn: &Connection) -> MusterResult<Vec<PendingMutation>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM pending_mutations ORDER BY local_seq ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], raw_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut pending = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        pending.push(raw.into_mutation()?);
    }
    Ok(pending)
}

/// Fetch one pending mutation by its sequence number.
pub fn get(conn: &Connection, local_seq: i64) -> MusterResult<Option<PendingMutation>> {
    let raw = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM pending_mutations WHERE local_seq = ?1"),
            params![local_seq],
            raw_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawMutation::into_mutation).transpose()
}

/// Delete one mutation. Returns `false` if it was already gone.
pub fn remove(conn: &Connection, local_seq: i64) -> MusterResult<bool> {
    let changed = conn
        .execute(
            "DELETE FROM pending_mutations WHERE local_seq = ?1",
            params![local_seq],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

/// Bump the attempt counter and remember the latest failure.
/// Returns `false` if the row no longer exists.
pub fn record_failure(
    conn: &Connection,
    local_seq: i64,
    error: &str,
    at: DateTime<Utc>,
) -> MusterResult<bool> {
    let stored: String = error.chars().take(MAX_STORED_ERROR_LEN).collect();
    let changed = conn
        .execute(
            "UPDATE pending_mutations
             SET attempts = attempts + 1, last_error = ?2, last_attempt_at = ?3
             WHERE local_seq = ?1",
            params![local_seq, stored, at.to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

/// Current queue depth.
pub fn count(conn: &Connection) -> MusterResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM pending_mutations", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}

/// Drop every pending mutation. Returns how many were removed.
pub fn clear(conn: &Connection) -> MusterResult<usize> {
    conn.execute("DELETE FROM pending_mutations", [])
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Column values as stored, before parsing the text-encoded fields.
struct RawMutation {
    local_seq: i64,
    entity_type: String,
    action: String,
    payload: String,
    enqueued_at: String,
    attempts: u32,
    last_error: Option<String>,
}

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMutation> {
    Ok(RawMutation {
        local_seq: row.get(0)?,
        entity_type: row.get(1)?,
        action: row.get(2)?,
        payload: row.get(3)?,
        enqueued_at: row.get(4)?,
        attempts: row.get(5)?,
        last_error: row.get(6)?,
    })
}

impl RawMutation {
    fn into_mutation(self) -> MusterResult<PendingMutation> {
        let corrupt = |details: String| StorageError::CorruptRow {
            table: "pending_mutations".to_string(),
            details: format!("local_seq {}: {details}", self.local_seq),
        };
        let entity_type = self
            .entity_type
            .parse::<EntityType>()
            .map_err(|e| corrupt(e.to_string()))?;
        let action = self
            .action
            .parse::<MutationAction>()
            .map_err(|e| corrupt(e.to_string()))?;
        let payload = serde_json::from_str(&self.payload).map_err(|e| corrupt(e.to_string()))?;
        let enqueued_at = DateTime::parse_from_rfc3339(&self.enqueued_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(PendingMutation {
            local_seq: self.local_seq,
            entity_type,
            action,
            payload,
            enqueued_at,
            attempts: self.attempts,
            last_error: self.last_error,
        })
    }
}
