//! Request executor: one logical call, bounded timeout, bounded retries.

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::{ApiConfig, TimeoutConfig};
use crate::error::ClientError;
use crate::http::request::{normalize_base, RequestSpec};
use crate::http::response::RemoteResponse;
use crate::observability::metrics;
use crate::resilience::{with_deadline, RetryPolicy};

/// Issues remote calls against one base URL.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    default_timeout: Duration,
    retry: RetryPolicy,
}

impl RequestExecutor {
    /// Create an executor with a pooled HTTP client.
    pub fn new(
        api: &ApiConfig,
        timeouts: &TimeoutConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base(&api.base_url)?;

        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if !api.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            base_url = %base_url,
            request_timeout_secs = timeouts.request_secs,
            max_attempts = retry.max_attempts,
            "Request executor initialized"
        );

        Ok(Self {
            http,
            base_url,
            api_key: api.api_key.clone(),
            default_timeout: timeouts.request(),
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute `spec`, retrying per its policy, and return the 2xx response.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<RemoteResponse, ClientError> {
        let url = spec.resolve(&self.base_url)?;
        let endpoint = spec.label();
        let timeout = spec.timeout.unwrap_or(self.default_timeout);
        let policy = spec.retry.as_ref().unwrap_or(&self.retry);
        let started = Instant::now();

        let result = policy
            .run(&endpoint, |attempt| {
                let url = url.clone();
                let endpoint = endpoint.as_str();
                async move { self.attempt(spec, url, endpoint, timeout, attempt).await }
            })
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_request(spec.method.as_str(), outcome, started);

        result
    }

    /// Execute and decode the JSON body. Decode failures are not retried.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
    ) -> Result<T, ClientError> {
        self.execute(spec).await?.json()
    }

    async fn attempt(
        &self,
        spec: &RequestSpec,
        url: Url,
        endpoint: &str,
        timeout: Duration,
        attempt: u32,
    ) -> Result<RemoteResponse, ClientError> {
        let timeout_ms = timeout.as_millis() as u64;

        let mut request = self
            .http
            .request(spec.method.clone(), url)
            .header(ACCEPT, "application/json");
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        tracing::trace!(endpoint, attempt, "Sending request");

        with_deadline(endpoint, timeout, async {
            let response = request
                .send()
                .await
                .map_err(|e| ClientError::from_transport(endpoint, e, timeout_ms))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ClientError::from_transport(endpoint, e, timeout_ms))?;

            if !status.is_success() {
                return Err(ClientError::RemoteStatus {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(RemoteResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            })
        })
        .await
    }
}
