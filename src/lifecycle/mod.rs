//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Caller creates a Cancellation
//!     → passes it into every submission
//!     → retry loop checks it before each attempt and while waiting
//!     → cancel() (or cancel_after) aborts pending waits
//! ```
//!
//! # Design Decisions
//! - Cancellation is sticky: once set it is never cleared
//! - An in-progress broadcast is never interrupted; it belongs to the provider

pub mod cancel;

pub use cancel::Cancellation;
