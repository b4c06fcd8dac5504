use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{AttendanceMark, Meeting, Member};

/// A cached copy of one remote entity plus its synced flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorRecord<T> {
    #[serde(flatten)]
    pub record: T,
    pub synced: bool,
}

impl<T> MirrorRecord<T> {
    pub fn synced(record: T) -> Self {
        Self {
            record,
            synced: true,
        }
    }
}

/// Server-side state of one group, as downloaded by the snapshot refresh.
#[derive(Debug, Clone, Default)]
pub struct GroupSnapshot {
    pub group_id: String,
    pub members: Vec<Member>,
    pub meetings: Vec<Meeting>,
    pub attendance: Vec<AttendanceMark>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl GroupSnapshot {
    /// Total number of rows the snapshot will write.
    pub fn row_count(&self) -> usize {
        self.members.len() + self.meetings.len() + self.attendance.len()
    }
}
