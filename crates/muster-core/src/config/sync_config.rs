use serde::{Deserialize, Serialize};

use super::defaults;

/// Reconciler behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How far back the snapshot refresh fetches meetings.
    pub snapshot_window_days: u32,
    /// Start a sync pass on every offline→online transition.
    pub auto_sync_on_reconnect: bool,
    /// Group whose members, meetings and attendance are mirrored locally.
    pub group_id: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            snapshot_window_days: defaults::DEFAULT_SNAPSHOT_WINDOW_DAYS,
            auto_sync_on_reconnect: defaults::DEFAULT_AUTO_SYNC_ON_RECONNECT,
            group_id: None,
        }
    }
}
