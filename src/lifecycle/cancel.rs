//! Caller-side cancellation for submissions.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cancellation signal passed into every submission call.
///
/// Clones share the same signal. Once cancelled it stays cancelled, and tasks
/// that start waiting afterwards still observe it.
#[derive(Debug, Clone)]
pub struct Cancellation {
    tx: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    /// Create a signal that is not cancelled.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel every holder of this signal.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Cancel after `delay` elapses. Must be called inside a Tokio runtime.
    pub fn cancel_after(&self, delay: Duration) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.cancel();
        });
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}
