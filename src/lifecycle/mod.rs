//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceContext::start (tasks.rs):
//!     spawn flusher + sweeper → share one CancellationToken
//!
//! Shutdown (tasks.rs):
//!     cancel token → flusher drains queue → await tasks (with grace) → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → caller triggers shutdown
//! ```

pub mod signals;
pub mod tasks;

pub use signals::wait_for_shutdown_signal;
pub use tasks::BackgroundTasks;
