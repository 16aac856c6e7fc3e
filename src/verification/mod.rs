//! Challenge/response verification subsystem.
//!
//! # Data Flow
//! ```text
//! request_challenge(subject, channel)
//!     → store.rs creates session (TTL, attempt budget)
//!     → transport.rs asks the remote to deliver a one-time code
//!
//! validate_challenge(session_id, code)
//!     → store.rs checks expiry and attempt budget, counts the attempt
//!     → transport.rs asks the remote to check the code
//!     → verified: session consumed | rejected: session kept
//! ```

pub mod session;
pub mod store;
pub mod transport;

pub use session::{DeliveryChannel, VerificationSession};
pub use store::{SessionError, SessionStore, ValidationOutcome};
pub use transport::{ChallengeTransport, HttpChallengeTransport};
