//! Server entities mirrored on the client.
//!
//! Ids are client-generated UUIDs for anything created on the device, so an
//! entity created offline keeps the same id when it is replayed and later
//! attendance marks can reference it before the server has seen it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub group_id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Member {
    /// New active member with a fresh client-generated id.
    pub fn new(group_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            full_name: full_name.into(),
            email: None,
            phone: None,
            active: true,
        }
    }
}

/// A meeting of a group on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub group_id: String,
    pub held_on: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Meeting {
    /// New meeting with a fresh client-generated id.
    pub fn new(group_id: impl Into<String>, held_on: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: group_id.into(),
            held_on,
            title: title.into(),
            notes: None,
        }
    }
}

/// One member's presence at one meeting. Keyed on `(meeting_id, member_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub meeting_id: String,
    pub member_id: String,
    pub is_present: bool,
}

impl AttendanceMark {
    pub fn new(meeting_id: impl Into<String>, member_id: impl Into<String>, is_present: bool) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            member_id: member_id.into(),
            is_present,
        }
    }

    /// The natural composite key.
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey {
            meeting_id: self.meeting_id.clone(),
            member_id: self.member_id.clone(),
        }
    }
}

/// Composite key of an attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendanceKey {
    pub meeting_id: String,
    pub member_id: String,
}
