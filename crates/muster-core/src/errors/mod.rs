//! Error handling for Muster.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod payload_error;
pub mod remote_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use payload_error::PayloadError;
pub use remote_error::RemoteError;
pub use storage_error::StorageError;

/// Top-level error aggregating every subsystem error via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum MusterError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),
}

impl MusterError {
    /// Whether this error came from the remote store (network or rejection).
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

pub type MusterResult<T> = Result<T, MusterError>;
