/// Errors reported by the remote store or the transport in front of it.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("remote rejected the write ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: String, id: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}
