//! Entity ids, mirror serialization, and the save indicator.

use muster_core::errors::{MusterError, RemoteError};
use muster_core::models::{AttendanceMark, Member, MirrorRecord};
use muster_core::{SaveIndicator, SaveOutcome};

#[test]
fn new_members_get_distinct_client_ids() {
    let a = Member::new("grp-1", "Ada");
    let b = Member::new("grp-1", "Ada");
    assert_ne!(a.id, b.id);
    assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    assert!(a.active);
}

#[test]
fn mirror_record_flattens_entity_fields() {
    let record = MirrorRecord::synced(AttendanceMark::new("M1", "P1", true));
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["meeting_id"], "M1");
    assert_eq!(value["is_present"], true);
    assert_eq!(value["synced"], true);
}

#[test]
fn member_payload_without_optional_fields_decodes() {
    let member: Member =
        serde_json::from_value(serde_json::json!({"id": "p", "group_id": "g", "full_name": "N"}))
            .unwrap();
    assert!(member.active);
    assert!(member.email.is_none());
}

#[test]
fn save_indicator_has_three_distinct_states() {
    let remote = SaveIndicator::from_result(&Ok(SaveOutcome::SavedRemote));
    let local = SaveIndicator::from_result(&Ok(SaveOutcome::SavedLocally { local_seq: 3 }));
    let failed = SaveIndicator::from_result(&Err(MusterError::Remote(RemoteError::Network {
        reason: "timeout".into(),
    })));

    assert_eq!(remote, SaveIndicator::SavedRemote);
    assert_eq!(local, SaveIndicator::SavedLocalPending);
    assert!(failed.is_failure());
    assert_ne!(remote.label(), local.label());
    assert!(failed.label().contains("timeout"));
}

mod decode_properties {
    use muster_core::models::{EntityType, MutationAction, RemoteWrite};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn entity() -> impl Strategy<Value = EntityType> {
        prop_oneof![
            Just(EntityType::Member),
            Just(EntityType::Meeting),
            Just(EntityType::Attendance),
        ]
    }

    fn action() -> impl Strategy<Value = MutationAction> {
        prop_oneof![
            Just(MutationAction::Create),
            Just(MutationAction::Update),
            Just(MutationAction::Delete),
        ]
    }

    fn payload() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9-]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("meeting_id".to_string()),
                        Just("member_id".to_string()),
                        Just("is_present".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..5
                )
                .prop_map(|m| json!(m)),
            ]
        })
    }

    proptest! {
        #[test]
        fn decoded_write_keeps_the_entity_type(e in entity(), a in action(), p in payload()) {
            if let Ok(write) = RemoteWrite::decode(e, a, &p) {
                prop_assert_eq!(write.entity_type(), e);
            }
        }

        #[test]
        fn attendance_marks_always_decode(
            meeting in "[A-Z][0-9]{1,3}",
            member in "[A-Z][0-9]{1,3}",
            present in any::<bool>(),
        ) {
            let p = json!({"meeting_id": meeting, "member_id": member, "is_present": present});
            let write = RemoteWrite::decode(EntityType::Attendance, MutationAction::Update, &p).unwrap();
            prop_assert_eq!(write.target(), format!("{meeting}/{member}"));
        }
    }
}
