//! # muster-core
//!
//! Foundation crate for the Muster offline sync engine.
//! Defines entity and mutation types, the remote-store trait, errors, config,
//! and tracing setup. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MusterConfig;
pub use errors::{MusterError, MusterResult};
pub use models::{
    AttendanceMark, ConnectivityState, EntityType, Meeting, Member, MirrorRecord,
    MutationAction, PendingMutation, SaveIndicator, SaveOutcome, SyncSession,
};
pub use traits::IRemoteStore;
