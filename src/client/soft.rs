//! Boundary between the client core and user-facing callers.

use crate::error::ClientError;
use crate::observability::metrics;

/// Log and count a failed call, handing the caller `None` instead.
///
/// Façades use this where a missing value renders better than an error,
/// e.g. a balance tile that shows a placeholder while the backend is down.
pub fn fail_soft<T>(operation: &str, result: Result<T, ClientError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                operation,
                kind = e.kind(),
                status = ?e.status(),
                error = %e,
                "Remote call failed, returning empty result"
            );
            metrics::record_soft_failure(operation, e.kind());
            None
        }
    }
}
