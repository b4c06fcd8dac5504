//! IRemoteStore: the server-side read/write interface the engine consumes.

use std::future::Future;

use chrono::NaiveDate;

use crate::errors::MusterResult;
use crate::models::{AttendanceKey, AttendanceMark, Meeting, Member};

/// Remote read/write interface.
///
/// Every write must be idempotent under repetition: the sync engine delivers
/// queued mutations at least once, so the same write can arrive twice.
/// Deletes of absent rows succeed. Returned futures are `Send` so a sync pass
/// can run on a spawned task.
pub trait IRemoteStore: Send + Sync {
    // --- Writes ---
    /// Insert or update the row keyed on `(meeting_id, member_id)`.
    fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> impl Future<Output = MusterResult<()>> + Send;
    fn delete_attendance(
        &self,
        key: &AttendanceKey,
    ) -> impl Future<Output = MusterResult<()>> + Send;
    /// Insert a new member. An existing row with the same id yields
    /// `RemoteError::AlreadyExists`.
    fn insert_member(&self, member: &Member) -> impl Future<Output = MusterResult<()>> + Send;
    fn update_member(&self, member: &Member) -> impl Future<Output = MusterResult<()>> + Send;
    fn delete_member(&self, id: &str) -> impl Future<Output = MusterResult<()>> + Send;
    /// Insert or update the meeting keyed on `id`.
    fn upsert_meeting(&self, meeting: &Meeting) -> impl Future<Output = MusterResult<()>> + Send;
    fn delete_meeting(&self, id: &str) -> impl Future<Output = MusterResult<()>> + Send;

    // --- Bulk reads ---
    fn list_members(
        &self,
        group_id: &str,
    ) -> impl Future<Output = MusterResult<Vec<Member>>> + Send;
    /// Meetings held on or after `since`.
    fn list_meetings(
        &self,
        group_id: &str,
        since: NaiveDate,
    ) -> impl Future<Output = MusterResult<Vec<Meeting>>> + Send;
    fn list_attendance(
        &self,
        meeting_ids: &[String],
    ) -> impl Future<Output = MusterResult<Vec<AttendanceMark>>> + Send;
}
