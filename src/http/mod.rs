//! HTTP request execution subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSpec (method, path, query, body)
//!     → executor.rs (resolve URL, auth header, JSON body)
//!     → resilience (deadline per attempt, retry with backoff)
//!     → RemoteResponse (2xx, body read) or ClientError (classified)
//! ```
//!
//! # Design Decisions
//! - One pooled reqwest client per executor
//! - Non-2xx is an error; decoding happens after the retry loop

pub mod executor;
pub mod request;
pub mod response;

pub use executor::RequestExecutor;
pub use request::RequestSpec;
pub use response::RemoteResponse;
