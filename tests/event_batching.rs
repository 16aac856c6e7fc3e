//! Event queue batching through the service context.

mod common;

use common::{eventually, test_config, MockBackend, MockReply};
use leasehold_client::queue::FlushOutcome;
use leasehold_client::{ClientError, ServiceContext};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn event_names(body: &Value) -> Vec<String> {
    body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["payload"]["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_forced_flush_submits_one_ordered_batch() {
    let backend = MockBackend::start(|_, _| MockReply::ok(json!({ "accepted": true }))).await;
    let ctx = ServiceContext::new(test_config(&backend.base_url())).unwrap();

    for name in ["page_view", "deposit_form_opened", "deposit_submitted"] {
        ctx.events().enqueue(json!({ "name": name })).unwrap();
    }
    let outcome = ctx.events().flush().await.unwrap();

    assert_eq!(outcome, FlushOutcome::Flushed(3));
    assert!(ctx.events().is_empty());

    let batches = backend.requests_to("events/batch");
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].method, "POST");
    assert_eq!(
        event_names(&batches[0].body),
        vec!["page_view", "deposit_form_opened", "deposit_submitted"]
    );
    assert!(batches[0].body["events"][0]["enqueuedAt"].is_string());
}

#[tokio::test]
async fn test_full_batch_flushes_without_timer() {
    let backend = MockBackend::start(|_, _| MockReply::ok(json!({}))).await;
    let mut ctx = ServiceContext::new(test_config(&backend.base_url())).unwrap();
    ctx.start();

    for i in 0..5 {
        ctx.events().enqueue(json!({ "name": format!("click-{i}") })).unwrap();
    }

    let flushed = eventually(Duration::from_secs(2), || backend.requests_to("events/batch").len() == 1).await;
    assert!(flushed, "batch should be flushed without waiting for the 60s timer");
    assert_eq!(event_names(&backend.requests_to("events/batch")[0].body).len(), 5);

    ctx.shutdown().await;
}

#[tokio::test]
async fn test_failed_batch_returns_to_head_in_order() {
    let backend = MockBackend::start(|_, _| MockReply::status(503, json!({}))).await;
    let ctx = ServiceContext::new(test_config(&backend.base_url())).unwrap();

    for name in ["a", "b", "c"] {
        ctx.events().enqueue(json!({ "name": name })).unwrap();
    }
    assert!(ctx.events().flush().await.is_err());

    let pending: Vec<Value> = ctx.events().pending().into_iter().map(|e| e.payload).collect();
    assert_eq!(
        pending,
        vec![json!({ "name": "a" }), json!({ "name": "b" }), json!({ "name": "c" })]
    );
    // One logical flush, retried by the executor.
    assert_eq!(backend.requests_to("events/batch").len(), 3);
}

#[tokio::test]
async fn test_events_survive_outage_and_flush_on_shutdown() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = healthy.clone();
    let backend = MockBackend::start(move |_, _| {
        if flag.load(Ordering::SeqCst) {
            MockReply::ok(json!({}))
        } else {
            MockReply::status(500, json!({}))
        }
    })
    .await;

    let mut ctx = ServiceContext::new(test_config(&backend.base_url())).unwrap();
    ctx.start();
    ctx.events().enqueue(json!({ "name": "first" })).unwrap();
    ctx.events().enqueue(json!({ "name": "second" })).unwrap();
    assert!(ctx.events().flush().await.is_err());
    assert_eq!(ctx.events().len(), 2);

    healthy.store(true, Ordering::SeqCst);
    ctx.shutdown().await;

    assert!(ctx.events().is_empty());
    let delivered = backend
        .requests_to("events/batch")
        .into_iter()
        .filter(|r| r.body["events"].as_array().is_some_and(|a| !a.is_empty()))
        .last()
        .unwrap();
    assert_eq!(event_names(&delivered.body), vec!["first", "second"]);
}

#[tokio::test]
async fn test_context_rejects_zero_intervals() {
    let mut config = test_config("http://127.0.0.1:9/api/v1");
    config.queue.flush_interval_ms = 0;
    config.cache.sweep_interval_secs = 0;

    match ServiceContext::new(config) {
        Err(ClientError::InvalidConfig(message)) => {
            assert!(message.contains("queue.flush_interval_ms"), "{message}");
            assert!(message.contains("cache.sweep_interval_secs"), "{message}");
        }
        Err(other) => panic!("expected a configuration error, got {other}"),
        Ok(_) => panic!("context accepted a zero flush interval"),
    }
}
