//! Resilient remote-data-access core for the leasehold deposit dashboard.
//!
//! # Architecture Overview
//!
//! ```text
//!   façade call
//!       │
//!       ├─(a) read ───▶ RemoteClient ──▶ TtlCache ──miss──▶ RequestExecutor ──▶ remote API
//!       │
//!       ├─(b) event ──▶ EventQueue ──batch (size / timer)──▶ EventSink ──▶ RequestExecutor
//!       │
//!       └─(c) verify ─▶ SessionStore ──deliver / check──▶ ChallengeTransport ──▶ RequestExecutor
//!
//!   RequestExecutor = RequestSpec + RetryPolicy (backoff, retryable predicate) + deadline
//!   ServiceContext  = owns all of the above, starts/stops flusher and sweeper tasks
//! ```

// Core subsystems
pub mod error;
pub mod http;
pub mod resilience;

// Stateful components
pub mod cache;
pub mod queue;
pub mod verification;

// Composition
pub mod client;
pub mod money;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use client::{fail_soft, RemoteClient, Resource, ServiceContext};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use money::{Amount, AmountError};
