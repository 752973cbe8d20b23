//! Lorenzo chain client library.
//!
//! Reliable message submission with keyring serialization and live retry
//! policy, plus decoding of the chain's mint and burn events.

pub mod blockchain;
pub mod config;
pub mod event;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::{Client, SubmissionEngine};
pub use config::ClientConfig;
pub use lifecycle::Cancellation;
