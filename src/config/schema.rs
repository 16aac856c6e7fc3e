//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client core.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the remote-data-access core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote API location and credentials.
    pub api: ApiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Read cache settings.
    pub cache: CacheConfig,

    /// Telemetry event queue settings.
    pub queue: QueueConfig,

    /// Challenge/response verification settings.
    pub verification: VerificationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every resource path is resolved against.
    pub base_url: String,

    /// Bearer token sent in the `Authorization` header. Empty disables the header.
    pub api_key: String,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            api_key: String::new(),
            use_system_proxy: true,
        }
    }
}

/// Timeout configuration for remote calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Default per-attempt request timeout in seconds.
    pub request_secs: u64,

    /// Per-attempt timeout for verification and document calls in seconds.
    pub verification_secs: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn verification(&self) -> Duration {
        Duration::from_secs(self.verification_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            verification_secs: 60,
        }
    }
}

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffStrategy {
    /// `attempt * base_delay`.
    Linear,
    /// `base_delay * 2^(attempt - 1)`, capped, with jitter.
    Exponential,
}

/// Which failures are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryOn {
    /// Network failures, timeouts, 5xx, 408 and 429.
    Transient,
    /// Every remote failure including 4xx statuses.
    AnyFailure,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Backoff growth function.
    pub strategy: BackoffStrategy,

    /// Retry classification.
    pub retry_on: RetryOn,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            strategy: BackoffStrategy::Linear,
            retry_on: RetryOn::Transient,
        }
    }
}

/// Read cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a resource does not specify its own, in seconds.
    pub default_ttl_secs: u64,

    /// Interval between background sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

/// What happens when the event queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Drop the oldest batch, log the loss, accept the new event.
    DropOldest,
    /// Refuse the new event.
    RejectNew,
}

/// Telemetry event queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum events per submitted batch; reaching it triggers a flush.
    pub batch_size: usize,

    /// Timer-driven flush interval in milliseconds.
    pub flush_interval_ms: u64,

    /// Hard cap on buffered events.
    pub max_capacity: usize,

    /// Behaviour once `max_capacity` is reached.
    pub overflow: OverflowPolicy,

    /// Resource path batches are posted to.
    pub batch_path: String,
}

impl QueueConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            flush_interval_ms: 30_000,
            max_capacity: 5_000,
            overflow: OverflowPolicy::DropOldest,
            batch_path: "events/batch".to_string(),
        }
    }
}

/// Challenge/response verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Lifetime of an issued challenge in seconds.
    pub session_ttl_secs: u64,

    /// Validation attempts allowed per challenge.
    pub max_attempts: u32,

    /// Resource path that triggers out-of-band code delivery.
    pub challenge_path: String,

    /// Resource path that checks a submitted code.
    pub validate_path: String,
}

impl VerificationConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 300,
            max_attempts: 3,
            challenge_path: "verification/challenges".to_string(),
            validate_path: "verification/validate".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wire_conventions() {
        let config = ClientConfig::default();
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.retries.strategy, BackoffStrategy::Linear);
        assert_eq!(config.verification.session_ttl_secs, 300);
        assert_eq!(config.verification.max_attempts, 3);
        assert_eq!(config.queue.batch_path, "events/batch");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://deposits.example.com/api"

            [queue]
            batch_size = 10
            overflow = "reject-new"

            [retries]
            retry_on = "any-failure"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://deposits.example.com/api");
        assert_eq!(config.queue.batch_size, 10);
        assert_eq!(config.queue.overflow, OverflowPolicy::RejectNew);
        assert_eq!(config.queue.max_capacity, 5_000);
        assert_eq!(config.retries.retry_on, RetryOn::AnyFailure);
        assert_eq!(config.cache.default_ttl_secs, 300);
    }
}
