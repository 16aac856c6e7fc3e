//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_requests_total` (counter): remote calls by method, outcome
//! - `client_request_duration_seconds` (histogram): latency including retries
//! - `client_retries_total` (counter): retry attempts by operation, error kind
//! - `client_cache_lookups_total` (counter): hit / miss / expired per cache
//! - `client_cache_entries` (gauge): live entries per cache
//! - `client_queue_depth` (gauge): buffered telemetry events
//! - `client_batches_total` (counter): batch submissions by outcome
//! - `client_events_dropped_total` (counter): events lost to the overflow policy
//! - `client_verifications_total` (counter): validation results by outcome
//! - `client_soft_failures_total` (counter): errors absorbed at the façade boundary

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, outcome: &'static str, started: Instant) {
    counter!("client_requests_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("client_request_duration_seconds", "method" => method.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_retry(operation: &str, kind: &'static str) {
    counter!("client_retries_total", "operation" => operation.to_string(), "kind" => kind)
        .increment(1);
}

pub fn record_cache_lookup(cache: &'static str, outcome: &'static str) {
    counter!("client_cache_lookups_total", "cache" => cache, "outcome" => outcome).increment(1);
}

pub fn record_cache_size(cache: &'static str, size: usize) {
    gauge!("client_cache_entries", "cache" => cache).set(size as f64);
}

pub fn record_queue_depth(depth: usize) {
    gauge!("client_queue_depth").set(depth as f64);
}

pub fn record_batch(outcome: &'static str, size: usize) {
    counter!("client_batches_total", "outcome" => outcome).increment(1);
    histogram!("client_batch_size").record(size as f64);
}

pub fn record_events_dropped(count: usize) {
    counter!("client_events_dropped_total").increment(count as u64);
}

pub fn record_verification(outcome: &'static str) {
    counter!("client_verifications_total", "outcome" => outcome).increment(1);
}

pub fn record_soft_failure(operation: &str, kind: &'static str) {
    counter!("client_soft_failures_total", "operation" => operation.to_string(), "kind" => kind)
        .increment(1);
}
