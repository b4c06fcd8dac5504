//! Pending mutation queue behavior on an in-memory store.

use muster_core::models::{EntityType, MutationAction};
use muster_storage::StorageEngine;
use serde_json::json;

fn attendance_payload(meeting: &str, member: &str, present: bool) -> serde_json::Value {
    json!({"meeting_id": meeting, "member_id": member, "is_present": present})
}

#[tokio::test]
async fn drain_returns_mutations_in_enqueue_order() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let a = storage
        .enqueue(EntityType::Attendance, MutationAction::Create, &attendance_payload("M1", "P1", true))
        .await
        .unwrap();
    let b = storage
        .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P2"}))
        .await
        .unwrap();
    let c = storage
        .enqueue(EntityType::Attendance, MutationAction::Update, &attendance_payload("M1", "P1", false))
        .await
        .unwrap();
    assert!(a < b && b < c);

    let drained = storage.drain().await.unwrap();
    let seqs: Vec<i64> = drained.iter().map(|m| m.local_seq).collect();
    assert_eq!(seqs, vec![a, b, c]);
    assert_eq!(drained[1].entity_type, EntityType::Member);
    assert_eq!(drained[1].action, MutationAction::Delete);
    assert_eq!(drained[2].payload["is_present"], json!(false));
    assert!(drained.iter().all(|m| m.attempts == 0 && m.last_error.is_none()));
}

#[tokio::test]
async fn drain_does_not_consume() {
    let storage = StorageEngine::open_in_memory().unwrap();
    storage
        .enqueue(EntityType::Meeting, MutationAction::Delete, &json!({"id": "M9"}))
        .await
        .unwrap();
    assert_eq!(storage.drain().await.unwrap().len(), 1);
    assert_eq!(storage.drain().await.unwrap().len(), 1);
    assert_eq!(storage.count().await.unwrap(), 1);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let seq = storage
        .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P1"}))
        .await
        .unwrap();
    assert!(storage.remove(seq).await.unwrap());
    assert!(!storage.remove(seq).await.unwrap());
    assert!(!storage.remove(9_999).await.unwrap());
    assert_eq!(storage.count().await.unwrap(), 0);
}

#[tokio::test]
async fn payload_is_not_validated_at_enqueue() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let seq = storage
        .enqueue(EntityType::Attendance, MutationAction::Create, &json!({"nonsense": [1, 2]}))
        .await
        .unwrap();
    let stored = storage.get(seq).await.unwrap().unwrap();
    assert_eq!(stored.payload, json!({"nonsense": [1, 2]}));
    assert!(stored.to_remote_write().is_err());
}

#[tokio::test]
async fn record_failure_counts_attempts_and_keeps_latest_error() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let seq = storage
        .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P1"}))
        .await
        .unwrap();
    assert!(storage.record_failure(seq, "timeout").await.unwrap());
    assert!(storage.record_failure(seq, "503").await.unwrap());

    let stored = storage.get(seq).await.unwrap().unwrap();
    assert_eq!(stored.attempts, 2);
    assert_eq!(stored.last_error.as_deref(), Some("503"));

    storage.remove(seq).await.unwrap();
    assert!(!storage.record_failure(seq, "late").await.unwrap());
}

#[tokio::test]
async fn stored_errors_are_truncated() {
    let storage = StorageEngine::open_in_memory().unwrap();
    let seq = storage
        .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P1"}))
        .await
        .unwrap();
    let long = "x".repeat(muster_core::constants::MAX_STORED_ERROR_LEN * 2);
    storage.record_failure(seq, &long).await.unwrap();
    let stored = storage.get(seq).await.unwrap().unwrap();
    assert_eq!(
        stored.last_error.map(|e| e.len()),
        Some(muster_core::constants::MAX_STORED_ERROR_LEN)
    );
}

#[tokio::test]
async fn clear_empties_the_queue() {
    let storage = StorageEngine::open_in_memory().unwrap();
    for id in ["P1", "P2", "P3"] {
        storage
            .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": id}))
            .await
            .unwrap();
    }
    assert_eq!(storage.clear().await.unwrap(), 3);
    assert_eq!(storage.count().await.unwrap(), 0);
    assert!(storage.drain().await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_of_unknown_seq_is_none() {
    let storage = StorageEngine::open_in_memory().unwrap();
    assert!(storage.get(42).await.unwrap().is_none());
}
