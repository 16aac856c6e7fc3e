//! Background flush task.
//!
//! Flushes on a fixed interval and whenever the queue signals that a batch is
//! full. On cancellation it drains the queue once more before returning.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::queue::batch::{EventQueue, FlushOutcome};
use crate::queue::sink::EventSink;

/// `tokio::time::interval` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Run until `cancel` fires, then perform a final flush.
pub async fn run_flusher<S: EventSink>(
    queue: Arc<EventQueue<S>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_ms = interval.as_millis() as u64,
        batch_size = queue.batch_size(),
        "Event flusher starting"
    );

    let mut ticker = time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                flush_logged(&queue, "timer").await;
            }
            _ = queue.flush_requested() => {
                flush_logged(&queue, "threshold").await;
            }
            _ = cancel.cancelled() => {
                tracing::info!("Event flusher received shutdown signal, draining queue");
                break;
            }
        }
    }

    match queue.flush_all().await {
        Ok(delivered) => {
            tracing::info!(delivered, "Final event flush complete");
        }
        Err(e) => {
            tracing::error!(
                remaining = queue.len(),
                error = %e,
                "Final event flush failed, buffered events lost on exit"
            );
        }
    }
}

/// Flush whole batches while the queue holds at least one, or once on the timer.
async fn flush_logged<S: EventSink>(queue: &EventQueue<S>, trigger: &'static str) {
    loop {
        match queue.flush().await {
            Ok(FlushOutcome::Flushed(n)) => {
                tracing::debug!(trigger, events = n, "Flushed events");
                if queue.len() < queue.batch_size() {
                    return;
                }
            }
            Ok(FlushOutcome::Empty) => return,
            Err(e) => {
                // Batch is back at the head; the next trigger retries it.
                tracing::warn!(trigger, error = %e, "Event flush failed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverflowPolicy;
    use crate::queue::batch::tests::{config, RecordingSink};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    async fn wait_for_batches(queue: &EventQueue<RecordingSink>, count: usize) {
        for _ in 0..100 {
            if queue.sink().batches().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} batches, got {}", queue.sink().batches().len());
    }

    #[tokio::test]
    async fn test_full_batch_flushes_without_timer() {
        let queue = Arc::new(EventQueue::new(
            RecordingSink::default(),
            &config(3, 100, OverflowPolicy::DropOldest),
        ));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flusher(queue.clone(), Duration::from_secs(3600), cancel.clone()));

        for i in 0..3 {
            queue.enqueue(json!(i)).unwrap();
        }

        wait_for_batches(&queue, 1).await;
        assert_eq!(queue.sink().batches()[0].len(), 3);
        assert!(queue.is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_timer_flushes_partial_batch() {
        let queue = Arc::new(EventQueue::new(
            RecordingSink::default(),
            &config(50, 100, OverflowPolicy::DropOldest),
        ));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flusher(queue.clone(), Duration::from_millis(20), cancel.clone()));

        queue.enqueue(json!("page_view")).unwrap();
        wait_for_batches(&queue, 1).await;

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let queue = Arc::new(EventQueue::new(
            RecordingSink::default(),
            &config(2, 100, OverflowPolicy::DropOldest),
        ));
        queue.sink().failing.store(true, Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flusher(queue.clone(), Duration::from_secs(3600), cancel.clone()));

        for i in 0..5 {
            queue.enqueue(json!(i)).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(queue.len(), 5, "failed flushes must keep every event");

        queue.sink().failing.store(false, Ordering::SeqCst);
        cancel.cancel();
        handle.await.unwrap();

        assert!(queue.is_empty());
        let delivered: usize = queue.sink().batches().iter().map(Vec::len).sum();
        assert_eq!(delivered, 5);
    }

    #[tokio::test]
    async fn test_zero_interval_still_flushes_and_drains() {
        let queue = Arc::new(EventQueue::new(
            RecordingSink::default(),
            &config(10, 100, OverflowPolicy::DropOldest),
        ));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flusher(queue.clone(), Duration::ZERO, cancel.clone()));

        queue.enqueue(json!("login")).unwrap();
        wait_for_batches(&queue, 1).await;

        cancel.cancel();
        handle.await.expect("flusher panicked");
    }
}
