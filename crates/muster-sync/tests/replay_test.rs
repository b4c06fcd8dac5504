//! Queue replay: FIFO order, idempotence, partial-failure isolation.

mod common;

use muster_core::errors::StorageError;
use muster_core::models::{EntityType, MutationAction};
use muster_sync::{SyncOutcome, SyncReport};
use serde_json::json;
use test_fixtures::{attendance, meeting_days_ago, member, InMemoryRemote, RemoteCall};

use common::{offline_engine, online_engine};

fn completed(outcome: SyncOutcome) -> SyncReport {
    match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected a completed pass, got {other:?}"),
    }
}

#[tokio::test]
async fn replays_in_enqueue_order() {
    let remote = InMemoryRemote::new();
    let engine = offline_engine(&remote).await;

    engine
        .submit_attendance(&attendance("M1", "P1", true))
        .await
        .unwrap();
    engine
        .submit_member(MutationAction::Delete, &member("P2", "G1", "Gone"))
        .await
        .unwrap();
    engine
        .submit_meeting(MutationAction::Create, &meeting_days_ago("M3", "G1", 0))
        .await
        .unwrap();
    assert_eq!(engine.pending_count(), 3);

    engine.connectivity().set_online(true);
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!(report.attempted, 3);
    assert_eq!(report.applied, 3);
    assert_eq!(report.remaining, 0);

    assert_eq!(
        remote.write_calls(),
        vec![
            RemoteCall::UpsertAttendance {
                target: "M1/P1".into(),
                is_present: true
            },
            RemoteCall::DeleteMember { id: "P2".into() },
            RemoteCall::UpsertMeeting { id: "M3".into() },
        ]
    );
    assert_eq!(engine.pending_count(), 0);
    assert!(engine.last_sync_time().is_some());
}

#[tokio::test]
async fn offline_true_then_false_leaves_one_remote_row() {
    let remote = InMemoryRemote::new();
    let engine = offline_engine(&remote).await;

    engine
        .submit_attendance(&attendance("M1", "P1", true))
        .await
        .unwrap();
    engine
        .submit_attendance(&attendance("M1", "P1", false))
        .await
        .unwrap();
    assert_eq!(engine.pending_count(), 2);

    engine.connectivity().set_online(true);
    engine.sync_now().await.unwrap();

    assert_eq!(remote.attendance_len(), 1);
    assert_eq!(remote.attendance("M1", "P1"), Some(attendance("M1", "P1", false)));
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.storage().count().await.unwrap(), 0);
}

#[tokio::test]
async fn replaying_the_same_mutations_twice_converges() {
    let mutations = [
        (EntityType::Member, MutationAction::Create, json!({"id": "P1", "group_id": "G1", "full_name": "Pat"})),
        (EntityType::Attendance, MutationAction::Create, json!({"meeting_id": "M1", "member_id": "P1", "is_present": true})),
        (EntityType::Meeting, MutationAction::Update, json!({"id": "M1", "group_id": "G1", "held_on": "2026-03-01", "title": "Circle"})),
        (EntityType::Member, MutationAction::Delete, json!({"id": "P9"})),
    ];

    let once = InMemoryRemote::new();
    let twice = InMemoryRemote::new();
    for (remote, copies) in [(&once, 1), (&twice, 2)] {
        let engine = online_engine(remote).await;
        for _ in 0..copies {
            for (entity_type, action, payload) in &mutations {
                engine
                    .storage()
                    .enqueue(*entity_type, *action, payload)
                    .await
                    .unwrap();
            }
        }
        let report = completed(engine.sync_now().await.unwrap());
        assert_eq!(report.failed, 0, "copies = {copies}");
        assert_eq!(report.remaining, 0);
    }

    assert_eq!(once.member("P1"), twice.member("P1"));
    assert_eq!(once.meeting("M1"), twice.meeting("M1"));
    assert_eq!(once.attendance("M1", "P1"), twice.attendance("M1", "P1"));
    assert_eq!(once.attendance_len(), twice.attendance_len());
}

#[tokio::test]
async fn failed_item_stays_queued_while_later_items_apply() {
    let remote = InMemoryRemote::new();
    remote.fail_writes_for("M1/PA");
    let engine = offline_engine(&remote).await;

    let a = engine
        .submit_attendance(&attendance("M1", "PA", true))
        .await
        .unwrap();
    engine
        .submit_attendance(&attendance("M1", "PB", true))
        .await
        .unwrap();
    engine
        .submit_attendance(&attendance("M1", "PC", false))
        .await
        .unwrap();

    engine.connectivity().set_online(true);
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.attempted, report.applied, report.failed), (3, 2, 1));
    assert_eq!(report.remaining, 1);
    assert_eq!(engine.pending_count(), 1);

    assert!(remote.attendance("M1", "PA").is_none());
    assert!(remote.attendance("M1", "PB").is_some());
    assert!(remote.attendance("M1", "PC").is_some());

    let queued = engine.pending_mutations().await.unwrap();
    assert_eq!(queued.len(), 1);
    let muster_core::models::SaveOutcome::SavedLocally { local_seq } = a else {
        panic!("offline submit should queue");
    };
    assert_eq!(queued[0].local_seq, local_seq);
    assert_eq!(queued[0].attempts, 1);
    assert!(queued[0].last_error.is_some());

    remote.heal("M1/PA");
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.applied, report.remaining), (1, 0));
    assert!(remote.attendance("M1", "PA").is_some());
}

#[tokio::test]
async fn undecodable_payload_is_a_per_item_failure() {
    let remote = InMemoryRemote::new();
    let engine = online_engine(&remote).await;
    engine
        .storage()
        .enqueue(EntityType::Attendance, MutationAction::Create, &json!({"member": 3}))
        .await
        .unwrap();
    engine
        .storage()
        .enqueue(EntityType::Meeting, MutationAction::Delete, &json!({"id": "M1"}))
        .await
        .unwrap();

    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.applied, report.failed, report.remaining), (1, 1, 1));

    let queued = engine.pending_mutations().await.unwrap();
    assert_eq!(queued[0].entity_type, EntityType::Attendance);
    assert_eq!(queued[0].attempts, 1);
    assert_eq!(remote.write_calls(), vec![RemoteCall::DeleteMeeting { id: "M1".into() }]);
}

#[tokio::test]
async fn replayed_member_insert_counts_as_applied() {
    let remote = InMemoryRemote::new();
    remote.put_member(member("P1", "G1", "Pat"));
    let engine = offline_engine(&remote).await;

    engine
        .submit_member(MutationAction::Create, &member("P1", "G1", "Pat"))
        .await
        .unwrap();
    engine.connectivity().set_online(true);

    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.applied, report.failed), (1, 0));
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn remote_outage_keeps_everything_queued() {
    let remote = InMemoryRemote::new();
    let engine = offline_engine(&remote).await;
    engine
        .submit_attendance(&attendance("M1", "P1", true))
        .await
        .unwrap();
    engine
        .submit_attendance(&attendance("M1", "P2", true))
        .await
        .unwrap();

    // Connectivity claims online but the remote is unreachable.
    remote.set_down(true);
    engine.connectivity().set_online(true);
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.applied, report.failed, report.remaining), (0, 2, 2));
    assert_eq!(engine.pending_count(), 2);
    assert!(engine.last_sync_time().is_some());
}

#[tokio::test]
async fn empty_queue_pass_completes() {
    let remote = InMemoryRemote::new();
    let engine = online_engine(&remote).await;
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!(report, SyncReport::default());
    assert!(engine.last_sync_time().is_some());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn applied_but_undequeued_item_is_reported_and_replayed() {
    let remote = InMemoryRemote::new();
    let engine = offline_engine(&remote).await;
    engine
        .submit_attendance(&attendance("M1", "P1", true))
        .await
        .unwrap();
    engine
        .storage()
        .pool()
        .writer
        .with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER keep_queue BEFORE DELETE ON pending_mutations
                 BEGIN SELECT RAISE(ABORT, 'queue locked'); END;",
            )
            .map_err(|e| StorageError::SqliteError { message: e.to_string() }.into())
        })
        .await
        .unwrap();

    engine.connectivity().set_online(true);
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!(
        (report.applied, report.applied_not_dequeued, report.failed, report.remaining),
        (0, 1, 0, 1)
    );
    assert!(remote.attendance("M1", "P1").is_some());
    assert_eq!(engine.pending_count(), 1);

    engine
        .storage()
        .pool()
        .writer
        .with_conn(|conn| {
            conn.execute_batch("DROP TRIGGER keep_queue;")
                .map_err(|e| StorageError::SqliteError { message: e.to_string() }.into())
        })
        .await
        .unwrap();
    let report = completed(engine.sync_now().await.unwrap());
    assert_eq!((report.applied, report.remaining), (1, 0));
    assert_eq!(remote.attendance_len(), 1);
}
