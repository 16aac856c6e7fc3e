//! Timeout enforcement.
//!
//! Wraps a single attempt in a cancellable deadline. Dropping the inner future
//! on expiry cancels the in-flight request.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Run `fut` with a deadline, mapping expiry to `ClientError::Timeout`.
pub async fn with_deadline<T, F>(endpoint: &str, limit: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout {
            endpoint: endpoint.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
