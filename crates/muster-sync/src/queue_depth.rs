//! Keeps `SyncSession::pending_count` in step with the durable queue.
//!
//! Enqueue-and-increment and recount-and-publish share one async lock, so a
//! recount can never publish a depth read before a concurrent enqueue and
//! overwrite that enqueue's increment.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use muster_core::errors::MusterResult;
use muster_core::models::{EntityType, MutationAction, SyncSession};
use muster_storage::StorageEngine;

pub struct QueueDepth {
    storage: Arc<StorageEngine>,
    session: Arc<watch::Sender<SyncSession>>,
    lock: Mutex<()>,
}

impl QueueDepth {
    pub fn new(storage: Arc<StorageEngine>, session: Arc<watch::Sender<SyncSession>>) -> Self {
        Self {
            storage,
            session,
            lock: Mutex::new(()),
        }
    }

    /// Durably queue a mutation and count it in the session.
    pub async fn enqueue(
        &self,
        entity_type: EntityType,
        action: MutationAction,
        payload: &serde_json::Value,
    ) -> MusterResult<i64> {
        let _held = self.lock.lock().await;
        let local_seq = self.storage.enqueue(entity_type, action, payload).await?;
        self.session.send_modify(|s| s.pending_count += 1);
        Ok(local_seq)
    }

    /// Read the queue depth and publish it together with `also`.
    pub async fn recount_with(
        &self,
        also: impl FnOnce(&mut SyncSession),
    ) -> MusterResult<usize> {
        let _held = self.lock.lock().await;
        let depth = self.storage.count().await?;
        self.session.send_modify(|s| {
            s.pending_count = depth;
            also(s);
        });
        Ok(depth)
    }

    /// Discard the whole queue.
    pub async fn clear(&self) -> MusterResult<usize> {
        let _held = self.lock.lock().await;
        let removed = self.storage.clear().await?;
        self.session.send_modify(|s| s.pending_count = 0);
        Ok(removed)
    }
}
