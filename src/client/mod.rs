//! Client façade core.
//!
//! # Data Flow
//! ```text
//! ServiceContext::new(config)
//!     → RequestExecutor ─┬→ RemoteClient (read-through TtlCache)
//!                        ├→ EventQueue<HttpEventSink>
//!                        └→ SessionStore<HttpChallengeTransport>
//!
//! ServiceContext::start → flusher + sweeper tasks
//! ServiceContext::shutdown → cancel → final flush → join
//! ```
//!
//! Domain façades implement [`Resource`] for their payload types and wrap
//! results with [`fail_soft`] where the UI should degrade instead of erroring.

pub mod context;
pub mod remote;
pub mod resource;
pub mod soft;

pub use context::{EventQueueHandle, ServiceContext, SessionStoreHandle};
pub use remote::RemoteClient;
pub use resource::{cache_key, Resource};
pub use soft::fail_soft;
