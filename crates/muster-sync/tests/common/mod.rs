#![allow(dead_code)]

use std::time::Duration;

use muster_core::config::SyncConfig;
use muster_core::models::{ConnectivityState, SyncSession};
use muster_storage::StorageEngine;
use muster_sync::{ConnectivityMonitor, SyncEngine};
use test_fixtures::InMemoryRemote;

pub async fn engine_with(
    remote: &InMemoryRemote,
    state: ConnectivityState,
    sync_config: SyncConfig,
) -> SyncEngine<InMemoryRemote> {
    SyncEngine::new(
        StorageEngine::open_in_memory().unwrap(),
        remote.clone(),
        ConnectivityMonitor::new(state),
        &sync_config,
    )
    .await
    .unwrap()
}

pub async fn online_engine(remote: &InMemoryRemote) -> SyncEngine<InMemoryRemote> {
    engine_with(remote, ConnectivityState::Online, SyncConfig::default()).await
}

pub async fn offline_engine(remote: &InMemoryRemote) -> SyncEngine<InMemoryRemote> {
    engine_with(remote, ConnectivityState::Offline, SyncConfig::default()).await
}

/// Wait (bounded) until the session satisfies `pred`.
pub async fn wait_for_session(
    engine: &SyncEngine<InMemoryRemote>,
    pred: impl FnMut(&SyncSession) -> bool,
) -> bool {
    let mut rx = engine.subscribe_session();
    let reached = matches!(
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred)).await,
        Ok(Ok(_))
    );
    reached
}
