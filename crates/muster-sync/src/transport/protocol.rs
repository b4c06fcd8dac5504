//! Versioned wire envelope shared by every remote call.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use muster_core::errors::RemoteError;

/// Current protocol version. Peers must agree on the major component.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Envelope for all requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRequest<T> {
    pub version: String,
    /// Unique per request, echoed back for log correlation.
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> RemoteRequest<T> {
    pub fn new(payload: T) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Envelope for all responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResponse<T> {
    pub version: String,
    pub request_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> RemoteResponse<T> {
    pub fn ok(request_id: String, data: T) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            request_id,
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(request_id: String, error: String) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            request_id,
            success: false,
            error: Some(error),
            data: None,
        }
    }

    /// Unwrap the envelope: check the protocol version, then the success flag.
    pub fn into_data(self) -> Result<Option<T>, RemoteError> {
        if major(&self.version) != major(PROTOCOL_VERSION) {
            return Err(RemoteError::VersionMismatch {
                expected: PROTOCOL_VERSION.to_string(),
                actual: self.version,
            });
        }
        if !self.success {
            return Err(RemoteError::Rejected {
                status: 200,
                reason: self
                    .error
                    .unwrap_or_else(|| "unspecified remote error".to_string()),
            });
        }
        Ok(self.data)
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Body of a delete-by-id call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdPayload {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupQuery {
    pub group_id: String,
    /// Lower bound on `held_on`, meetings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub meeting_ids: Vec<String>,
}
