//! v001: mirror_members, mirror_meetings, mirror_attendance.

use rusqlite::Connection;

use muster_core::errors::MusterResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> MusterResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS mirror_members (
            id            TEXT PRIMARY KEY,
            group_id      TEXT NOT NULL,
            full_name     TEXT NOT NULL,
            email         TEXT,
            phone         TEXT,
            active        INTEGER NOT NULL DEFAULT 1,
            synced        INTEGER NOT NULL DEFAULT 1,
            refreshed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_mirror_members_group ON mirror_members(group_id);

        CREATE TABLE IF NOT EXISTS mirror_meetings (
            id            TEXT PRIMARY KEY,
            group_id      TEXT NOT NULL,
            held_on       TEXT NOT NULL,
            title         TEXT NOT NULL,
            notes         TEXT,
            synced        INTEGER NOT NULL DEFAULT 1,
            refreshed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_mirror_meetings_group ON mirror_meetings(group_id, held_on);

        CREATE TABLE IF NOT EXISTS mirror_attendance (
            meeting_id    TEXT NOT NULL,
            member_id     TEXT NOT NULL,
            is_present    INTEGER NOT NULL,
            synced        INTEGER NOT NULL DEFAULT 1,
            refreshed_at  TEXT NOT NULL,
            PRIMARY KEY (meeting_id, member_id)
        );

        CREATE INDEX IF NOT EXISTS idx_mirror_attendance_member ON mirror_attendance(member_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
