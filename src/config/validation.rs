//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! constraints. Every problem is reported, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("queue.max_capacity ({capacity}) must be at least queue.batch_size ({batch_size})")]
    CapacityBelowBatch { capacity: usize, batch_size: usize },

    #[error("retries.max_delay_ms ({max}) is below retries.base_delay_ms ({base})")]
    MaxDelayBelowBase { base: u64, max: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.api.base_url.clone())),
    }

    let positive = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.verification_secs", config.timeouts.verification_secs),
        ("retries.max_attempts", u64::from(config.retries.max_attempts)),
        ("cache.default_ttl_secs", config.cache.default_ttl_secs),
        ("cache.sweep_interval_secs", config.cache.sweep_interval_secs),
        ("queue.batch_size", config.queue.batch_size as u64),
        ("queue.flush_interval_ms", config.queue.flush_interval_ms),
        ("verification.session_ttl_secs", config.verification.session_ttl_secs),
        ("verification.max_attempts", u64::from(config.verification.max_attempts)),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if config.queue.max_capacity < config.queue.batch_size {
        errors.push(ValidationError::CapacityBelowBatch {
            capacity: config.queue.max_capacity,
            batch_size: config.queue.batch_size,
        });
    }

    if config.retries.max_delay_ms < config.retries.base_delay_ms {
        errors.push(ValidationError::MaxDelayBelowBase {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ClientConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://example.com".into();
        config.queue.batch_size = 100;
        config.queue.max_capacity = 10;
        config.verification.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::InvalidBaseUrl("ftp://example.com".into())));
        assert!(errors.contains(&ValidationError::Zero("verification.max_attempts")));
        assert!(errors.contains(&ValidationError::CapacityBelowBatch {
            capacity: 10,
            batch_size: 100
        }));
    }
}
