//! Read cache subsystem.
//!
//! # Data Flow
//! ```text
//! read-through (client::RemoteClient):
//!     → ttl.rs get (hit → return; expired → remove, treat as miss)
//!     → executor on miss
//!     → ttl.rs set
//!
//! sweeper.rs (background): drops expired entries on an interval
//! ```
//!
//! # Design Decisions
//! - In-memory, not persisted; the remote system is the source of truth
//! - Expiry is lazy; sweeping only bounds memory
//! - Concurrent map so check-then-act is atomic per key

pub mod sweeper;
pub mod ttl;

pub use sweeper::{run_sweeper, Sweepable};
pub use ttl::{CacheEntry, TtlCache};
