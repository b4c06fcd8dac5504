//! Process-wide online/offline flag with change notification.

use std::sync::Arc;

use tokio::sync::watch;

use muster_core::models::ConnectivityState;

/// Advisory connectivity signal fed by the runtime.
///
/// Clones share the same state. A false "online" is harmless: the reconciler
/// sees ordinary per-item failures and leaves the queue intact.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityMonitor {
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn online() -> Self {
        Self::new(ConnectivityState::Online)
    }

    pub fn offline() -> Self {
        Self::new(ConnectivityState::Offline)
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Record a new state. Returns `true` if it differs from the previous one;
    /// subscribers are only woken on an actual change.
    pub fn set_state(&self, next: ConnectivityState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::info!(state = ?next, "connectivity changed");
        }
        changed
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.set_state(ConnectivityState::from_online(online))
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::offline()
    }
}
