//! Telemetry event queue subsystem.
//!
//! # Data Flow
//! ```text
//! enqueue (caller, never blocks on I/O)
//!     → batch.rs buffer tail
//!     → len >= batch_size ? signal flusher
//!
//! flusher.rs (background task): timer tick | signal | shutdown
//!     → batch.rs flush: take head prefix, submit via sink.rs
//!     → ack: forget batch | failure: put batch back at head
//! ```
//!
//! # Design Decisions
//! - At-least-once: an event leaves the queue only on acknowledgement
//! - Capacity is bounded; the overflow policy trades durability for memory
//! - Flush failures are logged, never reported to the enqueuer

pub mod batch;
pub mod event;
pub mod flusher;
pub mod sink;

pub use batch::{EnqueueOutcome, EventQueue, FlushOutcome, QueueError};
pub use event::{EventBatch, QueuedEvent};
pub use flusher::run_flusher;
pub use sink::{EventSink, HttpEventSink};
