//! # muster-sync
//!
//! Offline-first write path for the Muster client: a connectivity monitor,
//! the reconciler that replays the pending mutation queue and refreshes the
//! local mirror, the submission façade, and the [`SyncEngine`] that composes
//! them. An HTTP [`IRemoteStore`](muster_core::IRemoteStore) lives behind the
//! `http` feature.

pub mod connectivity;
pub mod dispatch;
pub mod engine;
pub mod queue_depth;
pub mod reconciler;
pub mod submit;
pub mod transport;

pub use connectivity::ConnectivityMonitor;
pub use engine::SyncEngine;
pub use queue_depth::QueueDepth;
pub use reconciler::{RefreshStatus, SkipReason, SyncOutcome, SyncReconciler, SyncReport};
pub use submit::MutationSubmitter;
pub use transport::{HttpClient, HttpClientConfig, HttpRemoteStore};
