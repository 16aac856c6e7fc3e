//! Batching write queue with at-least-once delivery.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;

use crate::config::{OverflowPolicy, QueueConfig};
use crate::error::ClientError;
use crate::observability::metrics;
use crate::queue::event::QueuedEvent;
use crate::queue::sink::EventSink;

/// Errors from `enqueue`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue is at capacity and the policy refuses new events.
    #[error("event queue full ({capacity} events), event rejected")]
    Overflow { capacity: usize },
}

/// What happened to an enqueued event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Buffered; waiting for the timer.
    Queued { id: String },
    /// Buffered and the batch threshold was reached, flush signalled.
    FlushTriggered { id: String },
    /// Buffered after dropping the oldest `dropped` events.
    Overflowed { id: String, dropped: usize },
}

impl EnqueueOutcome {
    pub fn id(&self) -> &str {
        match self {
            EnqueueOutcome::Queued { id }
            | EnqueueOutcome::FlushTriggered { id }
            | EnqueueOutcome::Overflowed { id, .. } => id,
        }
    }
}

/// Result of a successful `flush`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered.
    Empty,
    /// A batch of this many events was acknowledged.
    Flushed(usize),
}

/// Buffered events plus the size of the batch currently being submitted.
///
/// Both count against `max_capacity`.
#[derive(Default)]
struct Backlog {
    events: VecDeque<QueuedEvent>,
    in_flight: usize,
}

impl Backlog {
    fn total(&self) -> usize {
        self.events.len() + self.in_flight
    }
}

/// FIFO buffer of telemetry events submitted to `S` in batches.
///
/// Share behind an `Arc`; the flusher task and callers use the same instance.
/// Events inside an in-flight batch are never dropped to make room; overflow
/// discards the oldest buffered events instead.
pub struct EventQueue<S> {
    backlog: Mutex<Backlog>,
    /// Serializes flushes so a failed batch is back at the head before the next one is taken.
    flush_lock: tokio::sync::Mutex<()>,
    flush_signal: Notify,
    sink: S,
    batch_size: usize,
    max_capacity: usize,
    overflow: OverflowPolicy,
}

impl<S: EventSink> EventQueue<S> {
    pub fn new(sink: S, config: &QueueConfig) -> Self {
        let batch_size = config.batch_size.max(1);
        Self {
            backlog: Mutex::new(Backlog::default()),
            flush_lock: tokio::sync::Mutex::new(()),
            flush_signal: Notify::new(),
            sink,
            batch_size,
            max_capacity: config.max_capacity.max(batch_size),
            overflow: config.overflow,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn lock_backlog(&self) -> MutexGuard<'_, Backlog> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a payload to the tail.
    pub fn enqueue(&self, payload: serde_json::Value) -> Result<EnqueueOutcome, QueueError> {
        self.enqueue_event(QueuedEvent::new(payload))
    }

    /// Append a prepared event to the tail.
    pub fn enqueue_event(&self, event: QueuedEvent) -> Result<EnqueueOutcome, QueueError> {
        let id = event.id.clone();
        let mut backlog = self.lock_backlog();

        let mut dropped = 0;
        if backlog.total() >= self.max_capacity {
            match self.overflow {
                OverflowPolicy::RejectNew => {
                    drop(backlog);
                    self.flush_signal.notify_one();
                    tracing::warn!(capacity = self.max_capacity, "Event queue full, rejecting event");
                    return Err(QueueError::Overflow {
                        capacity: self.max_capacity,
                    });
                }
                OverflowPolicy::DropOldest => {
                    dropped = self.batch_size.min(backlog.events.len());
                    backlog.events.drain(..dropped);
                }
            }
        }

        backlog.events.push_back(event);
        let depth = backlog.events.len();
        drop(backlog);
        metrics::record_queue_depth(depth);

        if dropped > 0 {
            tracing::warn!(
                dropped,
                capacity = self.max_capacity,
                "Event queue full, dropped oldest batch"
            );
            metrics::record_events_dropped(dropped);
            self.flush_signal.notify_one();
            return Ok(EnqueueOutcome::Overflowed { id, dropped });
        }

        if depth >= self.batch_size {
            self.flush_signal.notify_one();
            return Ok(EnqueueOutcome::FlushTriggered { id });
        }

        Ok(EnqueueOutcome::Queued { id })
    }

    /// Submit up to `batch_size` events from the head.
    ///
    /// On failure the batch is put back at the head in its original order and
    /// the error is returned. Only when the queue would then exceed its
    /// capacity are the oldest events discarded, logged and counted.
    pub async fn flush(&self) -> Result<FlushOutcome, ClientError> {
        let _guard = self.flush_lock.lock().await;

        let batch: Vec<QueuedEvent> = {
            let mut backlog = self.lock_backlog();
            let take = self.batch_size.min(backlog.events.len());
            let batch: Vec<QueuedEvent> = backlog.events.drain(..take).collect();
            backlog.in_flight = batch.len();
            batch
        };

        if batch.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        match self.sink.submit(&batch).await {
            Ok(()) => {
                self.lock_backlog().in_flight = 0;
                tracing::debug!(events = batch.len(), "Flushed event batch");
                metrics::record_batch("acknowledged", batch.len());
                metrics::record_queue_depth(self.len());
                Ok(FlushOutcome::Flushed(batch.len()))
            }
            Err(err) => {
                let count = batch.len();
                let mut backlog = self.lock_backlog();
                backlog.in_flight = 0;
                for event in batch.into_iter().rev() {
                    backlog.events.push_front(event);
                }
                let excess = backlog.events.len().saturating_sub(self.max_capacity);
                backlog.events.drain(..excess);
                let depth = backlog.events.len();
                drop(backlog);

                tracing::warn!(events = count, depth, error = %err, "Batch submission failed, requeued");
                metrics::record_batch("failed", count);
                metrics::record_queue_depth(depth);
                if excess > 0 {
                    tracing::warn!(
                        dropped = excess,
                        capacity = self.max_capacity,
                        "Requeued batch exceeded capacity, dropped oldest events"
                    );
                    metrics::record_events_dropped(excess);
                }
                Err(err)
            }
        }
    }

    /// Flush batches until the queue is empty or a submission fails.
    ///
    /// Returns the number of events delivered.
    pub async fn flush_all(&self) -> Result<usize, ClientError> {
        let mut delivered = 0;
        loop {
            match self.flush().await? {
                FlushOutcome::Empty => return Ok(delivered),
                FlushOutcome::Flushed(n) => delivered += n,
            }
        }
    }

    /// Wait until an immediate flush has been requested.
    pub async fn flush_requested(&self) {
        self.flush_signal.notified().await;
    }

    /// Snapshot of buffered events, head first.
    pub fn pending(&self) -> Vec<QueuedEvent> {
        self.lock_backlog().events.iter().cloned().collect()
    }

    /// Buffered events, excluding a batch that is being submitted.
    pub fn len(&self) -> usize {
        self.lock_backlog().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_backlog().events.is_empty()
    }

    /// Size of the batch currently being submitted, zero when idle.
    pub fn in_flight(&self) -> usize {
        self.lock_backlog().in_flight
    }
}
