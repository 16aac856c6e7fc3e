//! Description of a single logical remote call.

use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::error::ClientError;
use crate::resilience::RetryPolicy;

/// A request to issue through the executor.
///
/// `path` is relative to the configured base URL. `segments` are appended
/// after it, each percent-encoded as exactly one path segment.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub segments: Vec<String>,
    pub query: Vec<(String, Option<String>)>,
    pub body: Option<serde_json::Value>,
    /// Per-attempt deadline; the executor default applies when unset.
    pub timeout: Option<Duration>,
    /// Overrides the executor's retry policy.
    pub retry: Option<RetryPolicy>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            retry: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one caller-supplied path segment, such as a record id.
    ///
    /// `/`, `?` and `#` inside it are encoded rather than interpreted.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Add a query parameter. `None` values are dropped from the URL.
    pub fn query<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidRequest(format!("unserializable body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Label used in logs, errors and metrics, e.g. `GET properties/42`.
    pub fn label(&self) -> String {
        let mut label = format!("{} {}", self.method, self.path.trim_start_matches('/'));
        for segment in &self.segments {
            label.push('/');
            label.push_str(segment);
        }
        label
    }

    /// Resolve against `base` and append defined query parameters.
    pub fn resolve(&self, base: &Url) -> Result<Url, ClientError> {
        let mut url = base
            .join(self.path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidRequest(format!("bad path '{}': {e}", self.path)))?;

        if !self.segments.is_empty() {
            if let Some(bad) = self
                .segments
                .iter()
                .find(|s| s.is_empty() || *s == "." || *s == "..")
            {
                return Err(ClientError::InvalidRequest(format!(
                    "path segment '{bad}' does not name a record"
                )));
            }
            url.path_segments_mut()
                .map_err(|()| ClientError::InvalidRequest(format!("base URL '{base}' cannot take a path")))?
                .pop_if_empty()
                .extend(&self.segments);
        }

        let defined: Vec<(&str, &str)> = self
            .query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .collect();

        if !defined.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in defined {
                pairs.append_pair(k, v);
            }
        }

        Ok(url)
    }
}

/// Normalize a base URL so relative joins keep its last path segment.
pub fn normalize_base(base: &str) -> Result<Url, ClientError> {
    let with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    Url::parse(&with_slash)
        .map_err(|e| ClientError::InvalidRequest(format!("bad base URL '{base}': {e}")))
}
