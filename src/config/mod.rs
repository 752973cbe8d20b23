//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated)
//!     → Client::new
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → changed retry section sent over the watcher channel
//!     → Client::apply_retry_config updates the live retry policy
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the retry section is hot-reloadable; endpoints and keys need a new client

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, LogFormat, ObservabilityConfig, QueryConfig, RetryConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
