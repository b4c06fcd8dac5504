//! Write intents: the queued form and the decoded form used for dispatch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::entity::{AttendanceKey, AttendanceMark, Meeting, Member};
use crate::errors::PayloadError;

/// Kind of entity a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Member,
    Meeting,
    Attendance,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Meeting => "meeting",
            Self::Attendance => "attendance",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "meeting" => Ok(Self::Meeting),
            "attendance" => Ok(Self::Attendance),
            other => Err(PayloadError::UnknownTag {
                kind: "entity type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// What the mutation does to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationAction {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(PayloadError::UnknownTag {
                kind: "mutation action".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// A durable, not-yet-confirmed write intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutation {
    /// Store-assigned FIFO key. Strictly increasing, never reused.
    pub local_seq: i64,
    pub entity_type: EntityType,
    pub action: MutationAction,
    /// Entity-shaped JSON. Not validated at enqueue time.
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    /// Failed replay attempts so far.
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl PendingMutation {
    /// Decode the payload into the remote write it stands for.
    pub fn to_remote_write(&self) -> Result<RemoteWrite, PayloadError> {
        RemoteWrite::decode(self.entity_type, self.action, &self.payload)
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// A decoded mutation, one variant per remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWrite {
    UpsertAttendance(AttendanceMark),
    DeleteAttendance(AttendanceKey),
    InsertMember(Member),
    UpdateMember(Member),
    DeleteMember { id: String },
    UpsertMeeting(Meeting),
    DeleteMeeting { id: String },
}

impl RemoteWrite {
    /// Map an `(entity, action, payload)` triple to its remote call.
    ///
    /// Attendance create and update both become an upsert on
    /// `(meeting_id, member_id)`, and so do meeting create and update on `id`.
    pub fn decode(
        entity_type: EntityType,
        action: MutationAction,
        payload: &serde_json::Value,
    ) -> Result<Self, PayloadError> {
        let write = match (entity_type, action) {
            (EntityType::Attendance, MutationAction::Create | MutationAction::Update) => {
                Self::UpsertAttendance(decode_as(entity_type, action, payload)?)
            }
            (EntityType::Attendance, MutationAction::Delete) => {
                Self::DeleteAttendance(decode_as(entity_type, action, payload)?)
            }
            (EntityType::Member, MutationAction::Create) => {
                Self::InsertMember(decode_as(entity_type, action, payload)?)
            }
            (EntityType::Member, MutationAction::Update) => {
                Self::UpdateMember(decode_as(entity_type, action, payload)?)
            }
            (EntityType::Member, MutationAction::Delete) => {
                let IdOnly { id } = decode_as(entity_type, action, payload)?;
                Self::DeleteMember { id }
            }
            (EntityType::Meeting, MutationAction::Create | MutationAction::Update) => {
                Self::UpsertMeeting(decode_as(entity_type, action, payload)?)
            }
            (EntityType::Meeting, MutationAction::Delete) => {
                let IdOnly { id } = decode_as(entity_type, action, payload)?;
                Self::DeleteMeeting { id }
            }
        };
        Ok(write)
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::UpsertAttendance(_) | Self::DeleteAttendance(_) => EntityType::Attendance,
            Self::InsertMember(_) | Self::UpdateMember(_) | Self::DeleteMember { .. } => {
                EntityType::Member
            }
            Self::UpsertMeeting(_) | Self::DeleteMeeting { .. } => EntityType::Meeting,
        }
    }

    /// Key of the affected row, for logging.
    pub fn target(&self) -> String {
        match self {
            Self::UpsertAttendance(mark) => format!("{}/{}", mark.meeting_id, mark.member_id),
            Self::DeleteAttendance(key) => format!("{}/{}", key.meeting_id, key.member_id),
            Self::InsertMember(m) | Self::UpdateMember(m) => m.id.clone(),
            Self::UpsertMeeting(m) => m.id.clone(),
            Self::DeleteMember { id } | Self::DeleteMeeting { id } => id.clone(),
        }
    }
}

fn decode_as<T: DeserializeOwned>(
    entity_type: EntityType,
    action: MutationAction,
    payload: &serde_json::Value,
) -> Result<T, PayloadError> {
    T::deserialize(payload).map_err(|e| PayloadError::Malformed {
        entity_type: entity_type.to_string(),
        action: action.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attendance_create_and_update_both_upsert() {
        let payload = json!({"meeting_id": "M1", "member_id": "P1", "is_present": true});
        for action in [MutationAction::Create, MutationAction::Update] {
            let write = RemoteWrite::decode(EntityType::Attendance, action, &payload).unwrap();
            assert_eq!(
                write,
                RemoteWrite::UpsertAttendance(AttendanceMark::new("M1", "P1", true))
            );
        }
    }

    #[test]
    fn member_delete_only_needs_id() {
        let write =
            RemoteWrite::decode(EntityType::Member, MutationAction::Delete, &json!({"id": "p-9"}))
                .unwrap();
        assert_eq!(write, RemoteWrite::DeleteMember { id: "p-9".into() });
        assert_eq!(write.entity_type(), EntityType::Member);
    }

    #[test]
    fn malformed_payload_names_entity_and_action() {
        let err = RemoteWrite::decode(EntityType::Meeting, MutationAction::Create, &json!({"x": 1}))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("meeting"), "{msg}");
        assert!(msg.contains("create"), "{msg}");
    }

    #[test]
    fn tags_roundtrip_through_strings() {
        for e in [EntityType::Member, EntityType::Meeting, EntityType::Attendance] {
            assert_eq!(e.as_str().parse::<EntityType>().unwrap(), e);
        }
        for a in [MutationAction::Create, MutationAction::Update, MutationAction::Delete] {
            assert_eq!(a.as_str().parse::<MutationAction>().unwrap(), a);
        }
        assert!("group".parse::<EntityType>().is_err());
    }
}
