/// A queued payload that cannot be interpreted as the entity it claims to be.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload for {entity_type} {action} does not decode: {reason}")]
    Malformed {
        entity_type: String,
        action: String,
        reason: String,
    },

    #[error("unknown {kind}: {value}")]
    UnknownTag { kind: String, value: String },

    #[error("payload serialization failed: {reason}")]
    Serialization { reason: String },
}
