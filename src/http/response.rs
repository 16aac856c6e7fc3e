//! Successful remote response.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// A 2xx response with its body fully read.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub endpoint: String,
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| ClientError::Decode {
            endpoint: self.endpoint.clone(),
            message: e.to_string(),
        })
    }
}
