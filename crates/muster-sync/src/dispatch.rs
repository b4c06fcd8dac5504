//! Mapping from a decoded write to the remote call that applies it.

use muster_core::errors::{MusterError, MusterResult, RemoteError};
use muster_core::models::RemoteWrite;
use muster_core::traits::IRemoteStore;

/// Apply one write against the remote store.
///
/// Member inserts that find the same id already present succeed: a replayed
/// create must be a no-op, not a failure.
pub async fn apply_write<R: IRemoteStore>(remote: &R, write: &RemoteWrite) -> MusterResult<()> {
    match write {
        RemoteWrite::UpsertAttendance(mark) => remote.upsert_attendance(mark).await,
        RemoteWrite::DeleteAttendance(key) => remote.delete_attendance(key).await,
        RemoteWrite::InsertMember(member) => match remote.insert_member(member).await {
            Err(MusterError::Remote(RemoteError::AlreadyExists { .. })) => {
                tracing::debug!(id = %member.id, "member already on remote, treating insert as applied");
                Ok(())
            }
            other => other,
        },
        RemoteWrite::UpdateMember(member) => remote.update_member(member).await,
        RemoteWrite::DeleteMember { id } => remote.delete_member(id).await,
        RemoteWrite::UpsertMeeting(meeting) => remote.upsert_meeting(meeting).await,
        RemoteWrite::DeleteMeeting { id } => remote.delete_meeting(id).await,
    }
}
