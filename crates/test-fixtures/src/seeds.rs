//! JSON seed data for populating an [`InMemoryRemote`](crate::InMemoryRemote).
//!
//! Meeting dates are stored as `days_ago` so the seeds stay inside or outside
//! the snapshot window no matter when the tests run.

use std::path::PathBuf;

use muster_core::models::{AttendanceMark, Meeting, Member};
use serde::Deserialize;

use crate::builders::meeting_days_ago;

#[derive(Debug, Clone, Deserialize)]
pub struct GroupSeed {
    pub group_id: String,
    pub members: Vec<Member>,
    pub meetings: Vec<SeedMeeting>,
    pub attendance: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMeeting {
    pub id: String,
    pub title: String,
    pub days_ago: i64,
}

impl GroupSeed {
    /// Resolve relative meeting dates against today.
    pub fn meetings(&self) -> Vec<Meeting> {
        self.meetings
            .iter()
            .map(|m| {
                let mut meeting = meeting_days_ago(&m.id, &self.group_id, m.days_ago);
                meeting.title = m.title.clone();
                meeting
            })
            .collect()
    }
}

fn seeds_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("seeds")
}

/// Load a seed file by name (without extension).
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_seed(name: &str) -> GroupSeed {
    let path = seeds_root().join(format!("{name}.json"));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read seed {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse seed {}: {}", path.display(), e))
}
