//! Read-through client over the executor and the shared cache.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::client::resource::{cache_key, Resource};
use crate::error::ClientError;
use crate::http::{RequestExecutor, RequestSpec};

/// Generic access to `GET/POST {base}/<collection>[/{id}]`.
///
/// Cheap to clone; clones share the executor and the cache.
#[derive(Clone)]
pub struct RemoteClient {
    executor: Arc<RequestExecutor>,
    cache: TtlCache<String, Value>,
}

impl RemoteClient {
    pub fn new(executor: Arc<RequestExecutor>, cache: TtlCache<String, Value>) -> Self {
        Self { executor, cache }
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn cache(&self) -> &TtlCache<String, Value> {
        &self.cache
    }

    /// Read one record, serving from the cache while its entry is valid.
    pub async fn fetch<R: Resource>(&self, id: &str) -> Result<R, ClientError> {
        let value = self.fetch_value(R::COLLECTION, id, R::cache_ttl()).await?;
        self.decode(R::COLLECTION, id, value)
    }

    /// Read one record from the remote and refresh its cache entry.
    pub async fn fetch_fresh<R: Resource>(&self, id: &str) -> Result<R, ClientError> {
        let value = self.load(R::COLLECTION, id, R::cache_ttl()).await?;
        self.decode(R::COLLECTION, id, value)
    }

    /// Untyped read-through for callers without a [`Resource`] type.
    pub async fn fetch_value(
        &self,
        collection: &str,
        id: &str,
        ttl: Option<Duration>,
    ) -> Result<Value, ClientError> {
        let key = cache_key(collection, id);
        if let Some(value) = self.cache.get(key.as_str()) {
            tracing::trace!(key = %key, "Cache hit");
            return Ok(value);
        }
        self.load(collection, id, ttl).await
    }

    /// `POST {base}/<collection>` and decode the created record.
    pub async fn create<R, B>(&self, body: &B) -> Result<R, ClientError>
    where
        R: Resource,
        B: Serialize + ?Sized,
    {
        let spec = RequestSpec::post(R::COLLECTION).json(body)?;
        self.executor.execute_json(&spec).await
    }

    /// `GET {base}/<collection>` with optional filters. Lists are never cached.
    pub async fn list<R: Resource>(
        &self,
        query: &[(&str, Option<&str>)],
    ) -> Result<Vec<R>, ClientError> {
        let spec = query
            .iter()
            .fold(RequestSpec::get(R::COLLECTION), |spec, (key, value)| {
                spec.query(*key, *value)
            });
        self.executor.execute_json(&spec).await
    }

    /// Drop a cached record so the next fetch goes to the remote.
    pub fn invalidate<R: Resource>(&self, id: &str) -> bool {
        self.cache.invalidate(cache_key(R::COLLECTION, id).as_str())
    }

    async fn load(
        &self,
        collection: &str,
        id: &str,
        ttl: Option<Duration>,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::get(collection).segment(id);
        let value: Value = self.executor.execute_json(&spec).await?;

        let ttl = ttl.unwrap_or_else(|| self.cache.default_ttl());
        self.cache
            .set_with_ttl(cache_key(collection, id), value.clone(), ttl);
        Ok(value)
    }

    fn decode<R: Resource>(&self, collection: &str, id: &str, value: Value) -> Result<R, ClientError> {
        serde_json::from_value(value).map_err(|e| {
            // A record that no longer matches its type must not keep being served.
            self.cache.invalidate(cache_key(collection, id).as_str());
            ClientError::Decode {
                endpoint: format!("GET {collection}/{id}"),
                message: e.to_string(),
            }
        })
    }
}
