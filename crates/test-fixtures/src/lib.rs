//! Shared test support for the Muster workspace: an instrumented in-memory
//! remote store, entity builders, and JSON seed data.

pub mod builders;
pub mod remote;
pub mod seeds;

pub use builders::{attendance, meeting_days_ago, member};
pub use remote::{InMemoryRemote, RemoteCall};
pub use seeds::{load_seed, GroupSeed};
