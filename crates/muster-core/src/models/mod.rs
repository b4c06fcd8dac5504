//! Entity, mutation, mirror and session types shared across the workspace.

pub mod entity;
pub mod mirror;
pub mod mutation;
pub mod session;

pub use entity::{AttendanceKey, AttendanceMark, Meeting, Member};
pub use mirror::{GroupSnapshot, MirrorRecord};
pub use mutation::{EntityType, MutationAction, PendingMutation, RemoteWrite};
pub use session::{ConnectivityState, SaveIndicator, SaveOutcome, SyncSession};
