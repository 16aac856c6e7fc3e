//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to ServiceContext, which builds every component from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApiConfig, BackoffStrategy, CacheConfig, ClientConfig, ObservabilityConfig, OverflowPolicy,
    QueueConfig, RetryConfig, RetryOn, TimeoutConfig, VerificationConfig,
};
pub use validation::{validate_config, ValidationError};
