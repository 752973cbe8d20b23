//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Broadcast attempt fails:
//!     → classifier.rs (expected? unrecoverable? otherwise transient)
//!     → retries.rs (attempts left? fixed or backoff delay?)
//! ```
//!
//! # Design Decisions
//! - Classification is isolated from the retry loop behind a trait
//! - The retry policy is owned by the client instance, not a global

pub mod classifier;
pub mod retries;

pub use classifier::{error_contained, ErrorClassifier, Sentinel, SubstringClassifier};
pub use retries::{DelayStrategy, RetryPolicy};
