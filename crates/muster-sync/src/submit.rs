//! Submission façade: apply a write directly when online, queue it otherwise.

use std::sync::Arc;

use muster_core::errors::{MusterResult, PayloadError};
use muster_core::models::{
    AttendanceMark, EntityType, Meeting, Member, MutationAction, RemoteWrite, SaveOutcome,
};
use muster_core::traits::IRemoteStore;

use crate::connectivity::ConnectivityMonitor;
use crate::dispatch::apply_write;
use crate::queue_depth::QueueDepth;

pub struct MutationSubmitter<R> {
    remote: Arc<R>,
    connectivity: ConnectivityMonitor,
    depth: Arc<QueueDepth>,
}

impl<R: IRemoteStore> MutationSubmitter<R> {
    pub fn new(remote: Arc<R>, connectivity: ConnectivityMonitor, depth: Arc<QueueDepth>) -> Self {
        Self {
            remote,
            connectivity,
            depth,
        }
    }

    /// Route one write.
    ///
    /// Online: decoded and applied to the remote, errors go back to the
    /// caller and the queue is untouched. Offline: appended to the durable
    /// queue without any network call, shape unchecked.
    pub async fn submit(
        &self,
        entity_type: EntityType,
        action: MutationAction,
        payload: serde_json::Value,
    ) -> MusterResult<SaveOutcome> {
        if self.connectivity.is_online() {
            let write = RemoteWrite::decode(entity_type, action, &payload)?;
            apply_write(self.remote.as_ref(), &write).await?;
            tracing::debug!(%entity_type, %action, target = %write.target(), "saved to remote");
            return Ok(SaveOutcome::SavedRemote);
        }

        let local_seq = self.depth.enqueue(entity_type, action, &payload).await?;
        tracing::info!(local_seq, %entity_type, %action, "offline, mutation queued");
        Ok(SaveOutcome::SavedLocally { local_seq })
    }

    /// Mark attendance. Create and update are the same upsert.
    pub async fn submit_attendance(&self, mark: &AttendanceMark) -> MusterResult<SaveOutcome> {
        self.submit(EntityType::Attendance, MutationAction::Update, to_payload(mark)?)
            .await
    }

    pub async fn submit_member(
        &self,
        action: MutationAction,
        member: &Member,
    ) -> MusterResult<SaveOutcome> {
        self.submit(EntityType::Member, action, to_payload(member)?)
            .await
    }

    pub async fn submit_meeting(
        &self,
        action: MutationAction,
        meeting: &Meeting,
    ) -> MusterResult<SaveOutcome> {
        self.submit(EntityType::Meeting, action, to_payload(meeting)?)
            .await
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> MusterResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        PayloadError::Serialization {
            reason: e.to_string(),
        }
        .into()
    })
}
