//! Terse entity constructors for tests.

use chrono::{Duration, Utc};
use muster_core::models::{AttendanceMark, Meeting, Member};

/// Member with a readable fixed id.
pub fn member(id: &str, group_id: &str, full_name: &str) -> Member {
    Member {
        id: id.to_string(),
        group_id: group_id.to_string(),
        full_name: full_name.to_string(),
        email: None,
        phone: None,
        active: true,
    }
}

/// Meeting held `days_ago` days before today (UTC).
pub fn meeting_days_ago(id: &str, group_id: &str, days_ago: i64) -> Meeting {
    Meeting {
        id: id.to_string(),
        group_id: group_id.to_string(),
        held_on: Utc::now().date_naive() - Duration::days(days_ago),
        title: format!("Meeting {id}"),
        notes: None,
    }
}

pub fn attendance(meeting_id: &str, member_id: &str, is_present: bool) -> AttendanceMark {
    AttendanceMark::new(meeting_id, member_id, is_present)
}
