//! Retry policy shared by every submission.
//!
//! # Responsibilities
//! - Hold the attempt count, inter-attempt delay and last-error-only flag
//! - Expose setters whose effect is visible to submissions already in flight
//!
//! # Design Decisions
//! - One policy per client, shared through `Arc`; nothing is snapshotted per
//!   call, so a change applies at the next retry iteration of every caller
//! - Fixed delay by default; exponential backoff is opt-in
//! - Plain atomics: fields are independent and read individually

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use rand::Rng;
use std::time::Duration;

use crate::config::schema::RetryConfig;

pub const DEFAULT_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY_MS: u64 = 400;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// How the pause between two attempts is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStrategy {
    /// The configured delay, every time.
    Fixed,
    /// The configured delay doubled per failed attempt, never above the
    /// configured maximum, with up to 10% shaved off at random.
    Backoff,
}

/// Mutable retry configuration.
#[derive(Debug)]
pub struct RetryPolicy {
    attempts: AtomicU32,
    delay_ms: AtomicU64,
    last_error_only: AtomicBool,
    backoff: AtomicBool,
    max_delay_ms: AtomicU64,
}

impl RetryPolicy {
    /// Create a fixed-delay policy.
    pub fn new(attempts: u32, delay: Duration, last_error_only: bool) -> Self {
        Self {
            attempts: AtomicU32::new(attempts),
            delay_ms: AtomicU64::new(delay.as_millis() as u64),
            last_error_only: AtomicBool::new(last_error_only),
            backoff: AtomicBool::new(false),
            max_delay_ms: AtomicU64::new(DEFAULT_MAX_DELAY_MS),
        }
    }

    /// Create a policy from the `[retry]` configuration section.
    pub fn from_config(config: &RetryConfig) -> Self {
        let policy = Self::default();
        policy.apply(config);
        policy
    }

    /// Overwrite every field from a configuration section.
    pub fn apply(&self, config: &RetryConfig) {
        self.set_attempts(config.attempts);
        self.set_delay_ms(config.delay_ms);
        self.set_last_error_only(config.last_error_only);
        self.set_backoff(config.backoff, Duration::from_millis(config.max_delay_ms));
    }

    pub fn set_attempts(&self, attempts: u32) {
        self.attempts.store(attempts, Ordering::SeqCst);
    }

    pub fn set_delay_ms(&self, milliseconds: u64) {
        self.delay_ms.store(milliseconds, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.set_delay_ms(delay.as_millis() as u64);
    }

    /// When false, exhaustion surfaces every attempt's error instead of the last.
    pub fn set_last_error_only(&self, last_error_only: bool) {
        self.last_error_only.store(last_error_only, Ordering::SeqCst);
    }

    /// Switch between fixed delay and capped exponential backoff.
    pub fn set_backoff(&self, enabled: bool, max_delay: Duration) {
        self.max_delay_ms
            .store(max_delay.as_millis() as u64, Ordering::SeqCst);
        self.backoff.store(enabled, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::SeqCst))
    }

    pub fn last_error_only(&self) -> bool {
        self.last_error_only.load(Ordering::SeqCst)
    }

    pub fn strategy(&self) -> DelayStrategy {
        if self.backoff.load(Ordering::SeqCst) {
            DelayStrategy::Backoff
        } else {
            DelayStrategy::Fixed
        }
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.load(Ordering::SeqCst))
    }

    /// Pause to observe after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.strategy() {
            DelayStrategy::Fixed => self.delay(),
            DelayStrategy::Backoff => {
                let ceiling = self.backoff_ceiling(attempt);
                // Jitter only shortens the pause, so `max_delay` stays a hard bound.
                let scale = rand::thread_rng().gen_range(0.9..=1.0);
                ceiling.mul_f64(scale).min(ceiling)
            }
        }
    }

    /// `delay * 2^(attempt - 1)`, clamped to `max_delay`.
    fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.delay()
            .checked_mul(1u32 << doublings)
            .map_or(self.max_delay(), |grown| grown.min(self.max_delay()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ATTEMPTS,
            Duration::from_millis(DEFAULT_DELAY_MS),
            true,
        )
    }
}
