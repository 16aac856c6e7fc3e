//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote call:
//!     → timeouts.rs (bound each attempt by a deadline)
//!     → On failure: retries.rs (classify, wait per backoff.rs, try again)
//!     → Budget exhausted: last classified error returned to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Only transient failures are retried unless configured otherwise
//! - Delay grows linearly by default

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::Backoff;
pub use retries::RetryPolicy;
pub use timeouts::with_deadline;
