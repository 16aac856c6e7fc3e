//! Typed remote resources.

use serde::de::DeserializeOwned;
use std::time::Duration;

/// A payload type served under one collection path.
///
/// Domain façades implement this for their record types and then go through
/// [`RemoteClient`](crate::client::RemoteClient) instead of issuing requests
/// themselves.
///
/// ```ignore
/// impl Resource for PropertyRecord {
///     const COLLECTION: &'static str = "properties";
///
///     fn cache_ttl() -> Option<Duration> {
///         Some(Duration::from_secs(30 * 60))
///     }
/// }
/// ```
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Path segment relative to the API base, without slashes.
    const COLLECTION: &'static str;

    /// Read-through TTL. `None` uses the cache default.
    fn cache_ttl() -> Option<Duration> {
        None
    }
}

/// Cache key for one record: `<collection>/<id>`.
pub fn cache_key(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}
