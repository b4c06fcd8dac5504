//! Local mirror tables: wholesale group replace and read-side queries.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use muster_core::errors::{MusterResult, StorageError};
use muster_core::models::{AttendanceMark, GroupSnapshot, Meeting, Member, MirrorRecord};

use crate::to_storage_err;

/// Replace every mirrored row of `snapshot.group_id` with the snapshot.
///
/// Runs in one transaction: either the whole group is rebuilt or nothing
/// changes. All written rows carry `synced = 1`. Returns the rows written.
pub fn replace_group_snapshot(conn: &Connection, snapshot: &GroupSnapshot) -> MusterResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("replace_group_snapshot begin: {e}")))?;

    let written = replace_inner(&tx, snapshot)?;

    tx.commit()
        .map_err(|e| to_storage_err(format!("replace_group_snapshot commit: {e}")))?;
    Ok(written)
}

fn replace_inner(conn: &Connection, snapshot: &GroupSnapshot) -> MusterResult<usize> {
    let group_id = snapshot.group_id.as_str();
    let refreshed_at = snapshot.fetched_at.unwrap_or_else(Utc::now).to_rfc3339();

    conn.execute(
        "DELETE FROM mirror_attendance
         WHERE meeting_id IN (SELECT id FROM mirror_meetings WHERE group_id = ?1)",
        params![group_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute("DELETE FROM mirror_meetings WHERE group_id = ?1", params![group_id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute("DELETE FROM mirror_members WHERE group_id = ?1", params![group_id])
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut member_stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO mirror_members
             (id, group_id, full_name, email, phone, active, synced, refreshed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for m in &snapshot.members {
        member_stmt
            .execute(params![
                m.id,
                m.group_id,
                m.full_name,
                m.email,
                m.phone,
                m.active,
                refreshed_at,
            ])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }

    let mut meeting_stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO mirror_meetings
             (id, group_id, held_on, title, notes, synced, refreshed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for m in &snapshot.meetings {
        meeting_stmt
            .execute(params![
                m.id,
                m.group_id,
                m.held_on.to_string(),
                m.title,
                m.notes,
                refreshed_at,
            ])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }

    let mut attendance_stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO mirror_attendance
             (meeting_id, member_id, is_present, synced, refreshed_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for a in &snapshot.attendance {
        attendance_stmt
            .execute(params![a.meeting_id, a.member_id, a.is_present, refreshed_at])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }

    Ok(snapshot.row_count())
}

/// Mirrored members of a group, by name.
pub fn members(conn: &Connection, group_id: &str) -> MusterResult<Vec<MirrorRecord<Member>>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, group_id, full_name, email, phone, active, synced
             FROM mirror_members WHERE group_id = ?1 ORDER BY full_name, id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![group_id], member_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// One mirrored member by id.
pub fn member(conn: &Connection, id: &str) -> MusterResult<Option<MirrorRecord<Member>>> {
    conn.query_row(
        "SELECT id, group_id, full_name, email, phone, active, synced
         FROM mirror_members WHERE id = ?1",
        params![id],
        member_row,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Mirrored meetings of a group, most recent first.
pub fn meetings(conn: &Connection, group_id: &str) -> MusterResult<Vec<MirrorRecord<Meeting>>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, group_id, held_on, title, notes, synced
             FROM mirror_meetings WHERE group_id = ?1 ORDER BY held_on DESC, id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![group_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, group_id, held_on, title, notes, synced) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let held_on = held_on
            .parse::<NaiveDate>()
            .map_err(|e| StorageError::CorruptRow {
                table: "mirror_meetings".to_string(),
                details: format!("meeting {id}: {e}"),
            })?;
        out.push(MirrorRecord {
            record: Meeting {
                id,
                group_id,
                held_on,
                title,
                notes,
            },
            synced,
        });
    }
    Ok(out)
}

/// Mirrored attendance rows of one meeting.
pub fn attendance(
    conn: &Connection,
    meeting_id: &str,
) -> MusterResult<Vec<MirrorRecord<AttendanceMark>>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT meeting_id, member_id, is_present, synced
             FROM mirror_attendance WHERE meeting_id = ?1 ORDER BY member_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![meeting_id], |row| {
            Ok(MirrorRecord {
                record: AttendanceMark {
                    meeting_id: row.get(0)?,
                    member_id: row.get(1)?,
                    is_present: row.get(2)?,
                },
                synced: row.get(3)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

fn member_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MirrorRecord<Member>> {
    Ok(MirrorRecord {
        record: Member {
            id: row.get(0)?,
            group_id: row.get(1)?,
            full_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            active: row.get(5)?,
        },
        synced: row.get(6)?,
    })
}
