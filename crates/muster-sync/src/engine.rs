//! SyncEngine: the application-facing handle. Owns the local store and
//! composes connectivity, the submission façade and the reconciler.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use muster_core::config::{MusterConfig, SyncConfig};
use muster_core::errors::MusterResult;
use muster_core::models::{
    AttendanceMark, EntityType, Meeting, Member, MirrorRecord, MutationAction, PendingMutation,
    SaveOutcome, SyncSession,
};
use muster_core::traits::IRemoteStore;
use muster_storage::StorageEngine;

use crate::connectivity::ConnectivityMonitor;
use crate::queue_depth::QueueDepth;
use crate::reconciler::{SyncOutcome, SyncReconciler};
use crate::submit::MutationSubmitter;

pub struct SyncEngine<R> {
    storage: Arc<StorageEngine>,
    connectivity: ConnectivityMonitor,
    session: Arc<watch::Sender<SyncSession>>,
    reconciler: Arc<SyncReconciler<R>>,
    submitter: MutationSubmitter<R>,
    depth: Arc<QueueDepth>,
    auto_sync_on_reconnect: bool,
    /// Dropped with the engine; auto-sync tasks stop when it closes.
    shutdown: watch::Sender<()>,
}

impl<R: IRemoteStore + 'static> SyncEngine<R> {
    /// Validate `config`, open the database named in `config.storage` and
    /// build an engine on it.
    pub async fn open(
        config: &MusterConfig,
        remote: R,
        connectivity: ConnectivityMonitor,
    ) -> MusterResult<Self> {
        config.validate()?;
        let storage = StorageEngine::open_with_config(&config.storage)?;
        Self::new(storage, remote, connectivity, &config.sync).await
    }

    /// Build an engine on an already-open store. The session's
    /// `pending_count` starts from the durable queue depth.
    pub async fn new(
        storage: StorageEngine,
        remote: R,
        connectivity: ConnectivityMonitor,
        sync_config: &SyncConfig,
    ) -> MusterResult<Self> {
        let storage = Arc::new(storage);
        let remote = Arc::new(remote);
        let pending_count = storage.count().await?;
        let (session, _) = watch::channel(SyncSession {
            pending_count,
            ..SyncSession::default()
        });
        let session = Arc::new(session);
        let depth = Arc::new(QueueDepth::new(Arc::clone(&storage), Arc::clone(&session)));

        let reconciler = Arc::new(SyncReconciler::new(
            Arc::clone(&storage),
            Arc::clone(&remote),
            connectivity.clone(),
            Arc::clone(&session),
            Arc::clone(&depth),
            sync_config.snapshot_window_days,
        ));
        reconciler.set_group(sync_config.group_id.clone());
        let submitter = MutationSubmitter::new(remote, connectivity.clone(), Arc::clone(&depth));
        let (shutdown, _) = watch::channel(());

        tracing::info!(
            pending_count,
            online = connectivity.is_online(),
            group_id = ?sync_config.group_id,
            "sync engine ready"
        );
        Ok(Self {
            storage,
            connectivity,
            session,
            reconciler,
            submitter,
            depth,
            auto_sync_on_reconnect: sync_config.auto_sync_on_reconnect,
            shutdown,
        })
    }

    // --- Status ---

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.session.borrow().is_syncing
    }

    pub fn pending_count(&self) -> usize {
        self.session.borrow().pending_count
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.session.borrow().last_sync_time
    }

    pub fn session(&self) -> SyncSession {
        self.session.borrow().clone()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<SyncSession> {
        self.session.subscribe()
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    // --- Sync ---

    pub async fn sync_now(&self) -> MusterResult<SyncOutcome> {
        self.reconciler.run().await
    }

    pub fn set_group(&self, group_id: Option<String>) {
        tracing::debug!(group_id = ?group_id, "group context changed");
        self.reconciler.set_group(group_id);
    }

    pub fn group_id(&self) -> Option<String> {
        self.reconciler.group_id()
    }

    /// Spawn the task that syncs on every offline→online transition, and
    /// once immediately if the engine is online with a non-empty queue.
    ///
    /// Returns `None` when `auto_sync_on_reconnect` is off. The task ends
    /// when the engine is dropped or every [`ConnectivityMonitor`] clone is
    /// gone. It only holds a weak reference to the reconciler between passes.
    pub fn spawn_auto_sync(&self) -> Option<JoinHandle<()>> {
        if !self.auto_sync_on_reconnect {
            return None;
        }
        let reconciler = Arc::downgrade(&self.reconciler);
        let mut rx = self.connectivity.subscribe();
        let mut shutdown = self.shutdown.subscribe();

        Some(tokio::spawn(async move {
            let mut was_online = rx.borrow_and_update().is_online();
            if was_online && !auto_sync(&reconciler, true).await {
                return;
            }
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = rx.borrow_and_update().is_online();
                        if online && !was_online && !auto_sync(&reconciler, false).await {
                            break;
                        }
                        was_online = online;
                    }
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("auto-sync task stopped");
        }))
    }

    // --- Writes ---

    pub async fn submit(
        &self,
        entity_type: EntityType,
        action: MutationAction,
        payload: serde_json::Value,
    ) -> MusterResult<SaveOutcome> {
        self.submitter.submit(entity_type, action, payload).await
    }

    pub async fn submit_attendance(&self, mark: &AttendanceMark) -> MusterResult<SaveOutcome> {
        self.submitter.submit_attendance(mark).await
    }

    pub async fn submit_member(
        &self,
        action: MutationAction,
        member: &Member,
    ) -> MusterResult<SaveOutcome> {
        self.submitter.submit_member(action, member).await
    }

    pub async fn submit_meeting(
        &self,
        action: MutationAction,
        meeting: &Meeting,
    ) -> MusterResult<SaveOutcome> {
        self.submitter.submit_meeting(action, meeting).await
    }

    // --- Queue inspection ---

    pub async fn pending_mutations(&self) -> MusterResult<Vec<PendingMutation>> {
        self.storage.drain().await
    }

    /// Discard every queued mutation. They will never reach the remote.
    pub async fn clear_pending(&self) -> MusterResult<usize> {
        self.depth.clear().await
    }

    // --- Mirror reads ---

    pub async fn mirror_members(&self, group_id: &str) -> MusterResult<Vec<MirrorRecord<Member>>> {
        self.storage.mirror_members(group_id).await
    }

    pub async fn mirror_member(&self, id: &str) -> MusterResult<Option<MirrorRecord<Member>>> {
        self.storage.mirror_member(id).await
    }

    pub async fn mirror_meetings(
        &self,
        group_id: &str,
    ) -> MusterResult<Vec<MirrorRecord<Meeting>>> {
        self.storage.mirror_meetings(group_id).await
    }

    pub async fn mirror_attendance(
        &self,
        meeting_id: &str,
    ) -> MusterResult<Vec<MirrorRecord<AttendanceMark>>> {
        self.storage.mirror_attendance(meeting_id).await
    }
}

/// Run one pass if the engine is still alive. Returns `false` once it is gone.
async fn auto_sync<R: IRemoteStore>(reconciler: &Weak<SyncReconciler<R>>, only_backlog: bool) -> bool {
    let Some(reconciler) = reconciler.upgrade() else {
        return false;
    };
    if only_backlog && reconciler.pending_count() == 0 {
        return true;
    }
    match reconciler.run().await {
        Ok(SyncOutcome::Completed(report)) => {
            tracing::debug!(applied = report.applied, failed = report.failed, "auto-sync done");
        }
        Ok(SyncOutcome::Skipped(reason)) => {
            tracing::debug!(?reason, "auto-sync skipped");
        }
        Err(e) => tracing::warn!(error = %e, "auto-sync failed"),
    }
    true
}
