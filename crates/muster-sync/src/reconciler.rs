//! SyncReconciler: replays the pending mutation queue in FIFO order, then
//! rebuilds the local mirror of the active group from a server snapshot.
//!
//! At most one pass runs at a time. The `is_syncing` flag in the shared
//! [`SyncSession`] is claimed with a check-and-set and released by a drop
//! guard, so an error or a cancelled future still returns the reconciler to
//! idle.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use tokio::sync::watch;

use muster_core::errors::MusterResult;
use muster_core::models::{GroupSnapshot, PendingMutation, SyncSession};
use muster_core::traits::IRemoteStore;
use muster_storage::StorageEngine;

use crate::connectivity::ConnectivityMonitor;
use crate::dispatch::apply_write;
use crate::queue_depth::QueueDepth;

/// Why a pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadySyncing,
}

/// Result of the mirror refresh step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefreshStatus {
    /// No group context set.
    #[default]
    Skipped,
    Refreshed { rows: usize },
    /// The queue replay above it still stands.
    Failed { reason: String },
}

/// Summary of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Queue items dispatched in this pass.
    pub attempted: usize,
    /// Items the remote accepted and that left the queue.
    pub applied: usize,
    /// Items the remote accepted that could not be dequeued. They stay
    /// queued and are replayed idempotently next pass.
    pub applied_not_dequeued: usize,
    /// Items that stay queued for the next trigger.
    pub failed: usize,
    /// Queue depth after the pass.
    pub remaining: usize,
    pub refresh: RefreshStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Completed(SyncReport),
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

enum Replay {
    Dequeued,
    AppliedStillQueued,
    Failed,
}

/// Releases `is_syncing` when the pass ends, however it ends.
struct SyncingGuard<'a> {
    session: &'a watch::Sender<SyncSession>,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.session.send_modify(|s| s.is_syncing = false);
    }
}

pub struct SyncReconciler<R> {
    storage: Arc<StorageEngine>,
    remote: Arc<R>,
    connectivity: ConnectivityMonitor,
    session: Arc<watch::Sender<SyncSession>>,
    depth: Arc<QueueDepth>,
    group_id: RwLock<Option<String>>,
    snapshot_window_days: u32,
}

impl<R: IRemoteStore> SyncReconciler<R> {
    pub fn new(
        storage: Arc<StorageEngine>,
        remote: Arc<R>,
        connectivity: ConnectivityMonitor,
        session: Arc<watch::Sender<SyncSession>>,
        depth: Arc<QueueDepth>,
        snapshot_window_days: u32,
    ) -> Self {
        Self {
            storage,
            remote,
            connectivity,
            session,
            depth,
            group_id: RwLock::new(None),
            snapshot_window_days,
        }
    }

    /// Group whose mirror is refreshed after each pass. `None` disables the refresh.
    pub fn set_group(&self, group_id: Option<String>) {
        match self.group_id.write() {
            Ok(mut slot) => *slot = group_id,
            Err(poisoned) => *poisoned.into_inner() = group_id,
        }
    }

    pub fn group_id(&self) -> Option<String> {
        match self.group_id.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.session.borrow().is_syncing
    }

    pub fn pending_count(&self) -> usize {
        self.session.borrow().pending_count
    }

    /// Run one reconciliation pass unless offline or a pass is already running.
    ///
    /// Per-item failures never abort the pass. An `Err` here means the queue
    /// itself could not be read.
    pub async fn run(&self) -> MusterResult<SyncOutcome> {
        if !self.connectivity.is_online() {
            tracing::debug!("sync skipped: offline");
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("sync skipped: pass already running");
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadySyncing));
        };

        let queue = self.storage.drain().await?;
        if queue.is_empty() {
            let remaining = self
                .depth
                .recount_with(|s| s.last_sync_time = Some(Utc::now()))
                .await?;
            tracing::debug!("sync pass complete: queue empty");
            return Ok(SyncOutcome::Completed(SyncReport {
                remaining,
                ..SyncReport::default()
            }));
        }

        let mut report = SyncReport {
            attempted: queue.len(),
            ..SyncReport::default()
        };
        tracing::info!(pending = queue.len(), "replaying pending mutations");

        for mutation in &queue {
            match self.replay_one(mutation).await {
                Replay::Dequeued => report.applied += 1,
                Replay::AppliedStillQueued => report.applied_not_dequeued += 1,
                Replay::Failed => report.failed += 1,
            }
        }

        let finished_at = Utc::now();
        report.remaining = match self
            .depth
            .recount_with(|s| s.last_sync_time = Some(finished_at))
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "could not recount queue after replay");
                let fallback = report.failed + report.applied_not_dequeued;
                self.session.send_modify(|s| s.last_sync_time = Some(finished_at));
                fallback
            }
        };

        if let Some(group_id) = self.group_id() {
            report.refresh = match self.refresh_snapshot(&group_id).await {
                Ok(rows) => {
                    tracing::info!(group_id = %group_id, rows, "mirror refreshed");
                    RefreshStatus::Refreshed { rows }
                }
                Err(e) => {
                    tracing::warn!(group_id = %group_id, error = %e, "mirror refresh failed");
                    RefreshStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
        }

        tracing::info!(
            attempted = report.attempted,
            applied = report.applied,
            applied_not_dequeued = report.applied_not_dequeued,
            failed = report.failed,
            remaining = report.remaining,
            "sync pass complete"
        );
        Ok(SyncOutcome::Completed(report))
    }

    fn try_begin(&self) -> Option<SyncingGuard<'_>> {
        let claimed = self.session.send_if_modified(|s| {
            if s.is_syncing {
                false
            } else {
                s.is_syncing = true;
                true
            }
        });
        claimed.then(|| SyncingGuard {
            session: &self.session,
        })
    }

    /// Dispatch one queued mutation.
    async fn replay_one(&self, mutation: &PendingMutation) -> Replay {
        let local_seq = mutation.local_seq;
        let result = match mutation.to_remote_write() {
            Ok(write) => apply_write(self.remote.as_ref(), &write).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                if let Err(e) = self.storage.remove(local_seq).await {
                    tracing::warn!(local_seq, error = %e, "applied mutation could not be dequeued");
                    return Replay::AppliedStillQueued;
                }
                tracing::debug!(
                    local_seq,
                    entity_type = %mutation.entity_type,
                    action = %mutation.action,
                    "mutation applied"
                );
                Replay::Dequeued
            }
            Err(e) => {
                tracing::warn!(
                    local_seq,
                    entity_type = %mutation.entity_type,
                    action = %mutation.action,
                    attempts = mutation.attempts + 1,
                    error = %e,
                    "mutation replay failed, keeping it queued"
                );
                if let Err(store_err) = self.storage.record_failure(local_seq, &e.to_string()).await {
                    tracing::warn!(local_seq, error = %store_err, "could not record replay failure");
                }
                Replay::Failed
            }
        }
    }

    async fn refresh_snapshot(&self, group_id: &str) -> MusterResult<usize> {
        let since = Utc::now().date_naive() - Duration::days(i64::from(self.snapshot_window_days));
        let members = self.remote.list_members(group_id).await?;
        let meetings = self.remote.list_meetings(group_id, since).await?;
        let meeting_ids: Vec<String> = meetings.iter().map(|m| m.id.clone()).collect();
        let attendance = if meeting_ids.is_empty() {
            Vec::new()
        } else {
            self.remote.list_attendance(&meeting_ids).await?
        };

        let snapshot = GroupSnapshot {
            group_id: group_id.to_string(),
            members,
            meetings,
            attendance,
            fetched_at: Some(Utc::now()),
        };
        self.storage.replace_group_snapshot(&snapshot).await
    }
}
