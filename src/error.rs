//! Error taxonomy shared by every remote call.

use thiserror::Error;

/// Errors surfaced by the request executor and everything built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection could not be established or was reset mid-flight.
    #[error("network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// The attempt did not complete before its deadline.
    #[error("request to {endpoint} timed out after {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// The remote answered with a non-2xx status.
    #[error("{endpoint} returned status {status}: {body}")]
    RemoteStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The request could not be built (bad URL, unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The configuration failed semantic validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Classify a transport-level failure from reqwest.
    pub fn from_transport(endpoint: &str, err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms,
            }
        } else if err.is_builder() {
            ClientError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            ClientError::Network {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Connectivity failures, timeouts, 5xx, 408 and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network { .. } | ClientError::Timeout { .. } => true,
            ClientError::RemoteStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            ClientError::Decode { .. }
            | ClientError::InvalidRequest(_)
            | ClientError::InvalidConfig(_) => false,
        }
    }

    /// Anything the remote side produced, including client-error statuses.
    ///
    /// Decode and request-construction failures are local and excluded.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Network { .. }
                | ClientError::Timeout { .. }
                | ClientError::RemoteStatus { .. }
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Network { .. } => "network",
            ClientError::Timeout { .. } => "timeout",
            ClientError::RemoteStatus { .. } => "remote_status",
            ClientError::Decode { .. } => "decode",
            ClientError::InvalidRequest(_) => "invalid_request",
            ClientError::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Result type for remote operations.
pub type ClientResult<T> = Result<T, ClientError>;
