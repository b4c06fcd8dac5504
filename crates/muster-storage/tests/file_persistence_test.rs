//! File-backed storage: durability across reopen and read-pool visibility.

use muster_core::config::StorageConfig;
use muster_core::models::{EntityType, MutationAction};
use muster_storage::migrations::{current_version, LATEST_VERSION};
use muster_storage::pool::pragmas::verify_wal_mode;
use muster_storage::StorageEngine;
use serde_json::json;
use tempfile::TempDir;
use test_fixtures::load_seed;

fn db_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("muster.db")
}

#[tokio::test]
async fn queue_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_in(&dir);
    {
        let storage = StorageEngine::open(&path).unwrap();
        storage
            .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P1"}))
            .await
            .unwrap();
        storage
            .enqueue(EntityType::Meeting, MutationAction::Delete, &json!({"id": "M1"}))
            .await
            .unwrap();
    }

    let storage = StorageEngine::open(&path).unwrap();
    let drained = storage.drain().await.unwrap();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].payload, json!({"id": "P1"}));
    assert_eq!(drained[1].payload, json!({"id": "M1"}));
}

#[tokio::test]
async fn local_seq_is_never_reused_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_in(&dir);
    let first = {
        let storage = StorageEngine::open(&path).unwrap();
        let seq = storage
            .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P1"}))
            .await
            .unwrap();
        storage.remove(seq).await.unwrap();
        seq
    };

    let storage = StorageEngine::open(&path).unwrap();
    let second = storage
        .enqueue(EntityType::Member, MutationAction::Delete, &json!({"id": "P2"}))
        .await
        .unwrap();
    assert!(second > first);
}

#[tokio::test]
async fn file_database_uses_wal_and_latest_schema() {
    let dir = TempDir::new().unwrap();
    let storage = StorageEngine::open(&db_in(&dir)).unwrap();
    let (wal, version) = storage
        .pool()
        .writer
        .with_conn(|conn| Ok((verify_wal_mode(conn)?, current_version(conn)?)))
        .await
        .unwrap();
    assert!(wal);
    assert_eq!(version, LATEST_VERSION);
    assert!(storage.pool().readers.is_some());
}

#[tokio::test]
async fn migrations_are_not_reapplied() {
    let dir = TempDir::new().unwrap();
    let path = db_in(&dir);
    drop(StorageEngine::open(&path).unwrap());
    let storage = StorageEngine::open(&path).unwrap();
    let version = storage
        .pool()
        .writer
        .with_conn(current_version)
        .await
        .unwrap();
    assert_eq!(version, LATEST_VERSION);
}

#[tokio::test]
async fn read_pool_sees_committed_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        db_path: db_in(&dir).display().to_string(),
        read_pool_size: 3,
        ..StorageConfig::default()
    };
    let storage = StorageEngine::open_with_config(&config).unwrap();
    assert_eq!(storage.pool().readers.as_ref().map(|r| r.size()), Some(3));

    let seed = load_seed("small_group");
    let snapshot = muster_core::models::GroupSnapshot {
        group_id: seed.group_id.clone(),
        members: seed.members.clone(),
        meetings: seed.meetings(),
        attendance: seed.attendance.clone(),
        fetched_at: None,
    };
    storage.replace_group_snapshot(&snapshot).await.unwrap();

    let members = storage.mirror_members(&seed.group_id).await.unwrap();
    assert_eq!(members.len(), 3);
    let meetings = storage.mirror_meetings(&seed.group_id).await.unwrap();
    assert_eq!(meetings.len(), 3);
    let marks = storage.mirror_attendance("mtg-recent").await.unwrap();
    assert_eq!(marks.len(), 2);
}

#[test]
fn durability_weakening_sync_level_is_refused() {
    let dir = TempDir::new().unwrap();
    for level in ["OFF", "FULL; DROP TABLE pending_mutations", ""] {
        let config = StorageConfig {
            db_path: db_in(&dir).display().to_string(),
            synchronous: level.to_string(),
            ..StorageConfig::default()
        };
        let err = StorageEngine::open_with_config(&config)
            .err()
            .unwrap_or_else(|| panic!("synchronous = {level:?} should be refused"));
        assert!(err.to_string().contains("storage.synchronous"), "{err}");
    }
}

#[tokio::test]
async fn normal_sync_level_is_accepted() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        db_path: db_in(&dir).display().to_string(),
        synchronous: "NORMAL".to_string(),
        ..StorageConfig::default()
    };
    let storage = StorageEngine::open_with_config(&config).unwrap();
    assert_eq!(storage.count().await.unwrap(), 0);
}
