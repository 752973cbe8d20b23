//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Submission engine, event decoder:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (attempt, max_attempts, error) rather than formatted strings
//! - The library never installs an exporter; no ports are owned here

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
