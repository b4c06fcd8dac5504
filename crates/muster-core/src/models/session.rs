use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::MusterResult;

/// Process-wide connectivity as reported by the runtime. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Ephemeral sync status surfaced to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSession {
    pub is_syncing: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub pending_count: usize,
}

/// Where a submitted write ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Applied to the remote store.
    SavedRemote,
    /// Queued on the device; delivered on a later sync pass.
    SavedLocally { local_seq: i64 },
}

/// Tri-state acknowledgment for a save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveIndicator {
    SavedRemote,
    SavedLocalPending,
    Failed { message: String },
}

impl SaveIndicator {
    pub fn from_result(result: &MusterResult<SaveOutcome>) -> Self {
        match result {
            Ok(SaveOutcome::SavedRemote) => Self::SavedRemote,
            Ok(SaveOutcome::SavedLocally { .. }) => Self::SavedLocalPending,
            Err(e) => Self::Failed {
                message: e.to_string(),
            },
        }
    }

    /// Short user-facing text.
    pub fn label(&self) -> &str {
        match self {
            Self::SavedRemote => "Saved",
            Self::SavedLocalPending => "Saved on this device, will sync when online",
            Self::Failed { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
