//! Reliable transaction submission.
//!
//! # Responsibilities
//! - Broadcast message batches under the keyring guard
//! - Retry transient broadcast failures under the shared retry policy
//! - Classify failures as expected, unrecoverable or transient
//! - Bridge the provider's completion callback back to the awaiting caller
//!
//! # Outcomes
//! ```text
//! guard acquisition fails             → ResourceUnavailable, no retry
//! sync error ∈ unrecoverable          → Unrecoverable, no retry
//! sync error ∈ expected               → Ok(None), stop retrying
//! sync error, unclassified            → retry after delay
//! attempts exhausted                  → Transient(last) / AttemptsExhausted(all)
//! callback error ∈ expected           → Ok(None)
//! callback error, unclassified        → Callback(err)
//! callback result, code != 0          → TxFailed { response, .. }
//! callback result, code == 0          → Ok(Some(response))
//! ```
//!
//! Every attempt registers a fresh one-shot completion. An attempt that fails
//! synchronously drops its sender, so only the attempt that handed off to the
//! mempool is ever awaited.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::blockchain::keyring::KeyringGuard;
use crate::blockchain::provider::{to_provider_msgs, ChainProvider, TxCallback};
use crate::blockchain::types::{
    Msg, ProviderError, RelayerMessage, RelayerTxResponse, SubmitError, SubmitResult,
};
use crate::lifecycle::Cancellation;
use crate::observability::metrics;
use crate::resilience::classifier::{ErrorClassifier, Sentinel, SubstringClassifier};
use crate::resilience::retries::RetryPolicy;

type Completion = oneshot::Receiver<Result<RelayerTxResponse, ProviderError>>;

/// What a successful attempt of the reliable path hands back to the loop.
enum Handoff {
    /// The batch reached the mempool; the callback will resolve this.
    Pending(Completion),
    /// The broadcast failed with an expected error; nothing to wait for.
    Expected,
}

/// Why an attempt did not succeed.
enum AttemptError {
    Retry(ProviderError),
    Abort(SubmitError),
}

/// Drives broadcasts through the provider.
#[derive(Clone)]
pub struct SubmissionEngine {
    provider: Arc<dyn ChainProvider>,
    guard: Arc<KeyringGuard>,
    policy: Arc<RetryPolicy>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl SubmissionEngine {
    pub fn new(
        provider: Arc<dyn ChainProvider>,
        guard: Arc<KeyringGuard>,
        policy: Arc<RetryPolicy>,
    ) -> Self {
        Self {
            provider,
            guard,
            policy,
            classifier: Arc::new(SubstringClassifier),
        }
    }

    /// Replace the substring classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn policy(&self) -> &Arc<RetryPolicy> {
        &self.policy
    }

    /// Send a single message to the mempool without waiting for inclusion.
    pub async fn send_msg_to_mempool(
        &self,
        ctx: &Cancellation,
        msg: Arc<dyn Msg>,
    ) -> SubmitResult<()> {
        self.send_msgs_to_mempool(ctx, &[msg]).await
    }

    /// Send a batch to the mempool without waiting for inclusion.
    ///
    /// Every broadcast error is retried; only keyring failures abort early.
    pub async fn send_msgs_to_mempool(
        &self,
        ctx: &Cancellation,
        msgs: &[Arc<dyn Msg>],
    ) -> SubmitResult<()> {
        if msgs.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let relayer_msgs = to_provider_msgs(msgs);
        let batch = relayer_msgs.as_slice();
        let result = self
            .retry(ctx, move || self.mempool_attempt(ctx, batch))
            .await;

        metrics::record_submit_outcome(match &result {
            Ok(()) => "success",
            Err(e) => outcome_label(e),
        });
        result
    }

    /// Reliably send a single message. See [`Self::reliably_send_msgs`].
    pub async fn reliably_send_msg(
        &self,
        ctx: &Cancellation,
        msg: Arc<dyn Msg>,
        expected_errors: &[Sentinel],
        unrecoverable_errors: &[Sentinel],
    ) -> SubmitResult<Option<RelayerTxResponse>> {
        self.reliably_send_msgs(ctx, &[msg], expected_errors, unrecoverable_errors)
            .await
    }

    /// Broadcast a batch and wait for its inclusion result.
    ///
    /// `Ok(None)` means an expected error suppressed the send; it cannot be
    /// told apart from "nothing happened". An on-chain failure returns
    /// [`SubmitError::TxFailed`], which still carries the transaction result.
    pub async fn reliably_send_msgs(
        &self,
        ctx: &Cancellation,
        msgs: &[Arc<dyn Msg>],
        expected_errors: &[Sentinel],
        unrecoverable_errors: &[Sentinel],
    ) -> SubmitResult<Option<RelayerTxResponse>> {
        if msgs.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }

        let relayer_msgs = to_provider_msgs(msgs);
        let batch = relayer_msgs.as_slice();
        let result = self
            .retry(ctx, move || {
                self.reliable_attempt(ctx, batch, expected_errors, unrecoverable_errors)
            })
            .await;

        let result = match result {
            Ok(Handoff::Pending(completion)) => {
                self.await_completion(ctx, completion, expected_errors).await
            }
            Ok(Handoff::Expected) => Ok(None),
            Err(e) => Err(e),
        };

        metrics::record_submit_outcome(match &result {
            Ok(Some(_)) => "success",
            Ok(None) => "expected",
            Err(e) => outcome_label(e),
        });
        result
    }

    async fn mempool_attempt(
        &self,
        ctx: &Cancellation,
        msgs: &[RelayerMessage],
    ) -> Result<(), AttemptError> {
        let sent = self
            .guard
            .with_exclusive_access(|| {
                self.provider
                    .send_messages_to_mempool(ctx, msgs, "", Vec::new())
            })
            .await;

        match sent {
            Err(guard_err) => {
                tracing::error!(
                    error = %guard_err,
                    "unrecoverable err when submitting the tx, skip retrying"
                );
                Err(AttemptError::Abort(guard_err.into()))
            }
            Ok(Err(err)) => Err(AttemptError::Retry(err)),
            Ok(Ok(())) => Ok(()),
        }
    }

    async fn reliable_attempt(
        &self,
        ctx: &Cancellation,
        msgs: &[RelayerMessage],
        expected_errors: &[Sentinel],
        unrecoverable_errors: &[Sentinel],
    ) -> Result<Handoff, AttemptError> {
        let (tx, rx) = oneshot::channel();
        let callback: TxCallback = Box::new(move |result| {
            // The caller may already have given up; nothing to deliver to then.
            let _ = tx.send(result);
        });

        let sent = self
            .guard
            .with_exclusive_access(|| {
                self.provider
                    .send_messages_to_mempool(ctx, msgs, "", vec![callback])
            })
            .await;

        let err = match sent {
            Err(guard_err) => {
                tracing::error!(
                    error = %guard_err,
                    "unrecoverable err when submitting the tx, skip retrying"
                );
                return Err(AttemptError::Abort(guard_err.into()));
            }
            Ok(Ok(())) => return Ok(Handoff::Pending(rx)),
            Ok(Err(err)) => err,
        };

        if self.classifier.contains(&err, unrecoverable_errors) {
            tracing::error!(
                error = %err,
                "unrecoverable err when submitting the tx, skip retrying"
            );
            return Err(AttemptError::Abort(SubmitError::Unrecoverable(err)));
        }
        if self.classifier.contains(&err, expected_errors) {
            tracing::error!(error = %err, "expected err when submitting the tx, skip retrying");
            return Ok(Handoff::Expected);
        }
        Err(AttemptError::Retry(err))
    }

    async fn await_completion(
        &self,
        ctx: &Cancellation,
        completion: Completion,
        expected_errors: &[Sentinel],
    ) -> SubmitResult<Option<RelayerTxResponse>> {
        let delivered = tokio::select! {
            delivered = completion => delivered.map_err(|_| SubmitError::CallbackDropped)?,
            _ = ctx.cancelled() => return Err(SubmitError::Cancelled),
        };

        match delivered {
            Err(err) if self.classifier.contains(&err, expected_errors) => {
                tracing::debug!(error = %err, "expected err reported by tx callback");
                Ok(None)
            }
            Err(err) => Err(SubmitError::Callback(err)),
            Ok(response) if !response.is_success() => {
                tracing::warn!(
                    tx_hash = %response.tx_hash,
                    code = response.code,
                    codespace = %response.codespace,
                    "Transaction included with non-zero code"
                );
                Err(SubmitError::TxFailed {
                    code: response.code,
                    codespace: response.codespace.clone(),
                    response: Box::new(response),
                })
            }
            Ok(response) => {
                tracing::debug!(
                    tx_hash = %response.tx_hash,
                    height = response.height,
                    "Transaction included"
                );
                Ok(Some(response))
            }
        }
    }

    /// Run `op` until it succeeds, aborts, or the policy's attempts run out.
    ///
    /// The policy is re-read on every iteration, so setter calls made while a
    /// submission is in flight apply from its next iteration on.
    async fn retry<T, F, Fut>(&self, ctx: &Cancellation, mut op: F) -> SubmitResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        if self.policy.attempts() == 0 {
            return Err(SubmitError::ConfigInvalid(
                "retry attempts must be at least 1".to_string(),
            ));
        }

        let mut errors: Vec<ProviderError> = Vec::new();
        let mut attempt: u32 = 0;
        loop {
            if ctx.is_cancelled() {
                return Err(SubmitError::Cancelled);
            }

            attempt += 1;
            metrics::record_submit_attempt();
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Abort(e)) => return Err(e),
                Err(AttemptError::Retry(err)) => err,
            };

            let max_attempts = self.policy.attempts();
            if attempt >= max_attempts {
                tracing::warn!(attempts = attempt, error = %err, "Retry attempts exhausted");
                if self.policy.last_error_only() {
                    return Err(SubmitError::Transient(err));
                }
                errors.push(err);
                return Err(SubmitError::AttemptsExhausted {
                    attempts: attempt,
                    errors,
                });
            }

            tracing::debug!(
                attempt = attempt + 1,
                max_attempts = max_attempts,
                error = %err,
                "retrying"
            );
            metrics::record_submit_retry();
            errors.push(err);

            let delay = self.policy.delay_for(attempt);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancelled() => return Err(SubmitError::Cancelled),
            }
        }
    }
}

impl std::fmt::Debug for SubmissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionEngine")
            .field("guard", &self.guard)
            .field("policy", &self.policy)
            .finish()
    }
}

fn outcome_label(err: &SubmitError) -> &'static str {
    match err {
        SubmitError::EmptyBatch | SubmitError::ConfigInvalid(_) => "rejected",
        SubmitError::ResourceUnavailable(_) | SubmitError::Unrecoverable(_) => "unrecoverable",
        SubmitError::Transient(_) | SubmitError::AttemptsExhausted { .. } => "exhausted",
        SubmitError::Callback(_) | SubmitError::CallbackDropped => "callback_error",
        SubmitError::TxFailed { .. } => "tx_failed",
        SubmitError::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{msg_type, AnyMsg};
    use crate::resilience::classifier::sdk;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails synchronously `failures` times, then hands off and answers with `code`.
    struct FlakyProvider {
        failures: u32,
        error: &'static str,
        code: u32,
        calls: AtomicU32,
    }

    impl FlakyProvider {
        fn new(failures: u32, error: &'static str, code: u32) -> Self {
            Self {
                failures,
                error,
                code,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainProvider for FlakyProvider {
        async fn send_messages_to_mempool(
            &self,
            _ctx: &Cancellation,
            _msgs: &[RelayerMessage],
            _memo: &str,
            callbacks: Vec<TxCallback>,
        ) -> Result<(), ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(ProviderError::new(self.error));
            }
            let code = self.code;
            tokio::spawn(async move {
                for callback in callbacks {
                    callback(Ok(RelayerTxResponse {
                        height: 10,
                        tx_hash: "ABCD".to_string(),
                        code,
                        ..Default::default()
                    }));
                }
            });
            Ok(())
        }
    }

    fn engine(provider: Arc<dyn ChainProvider>) -> SubmissionEngine {
        let policy = Arc::new(RetryPolicy::default());
        policy.set_delay_ms(1);
        SubmissionEngine::new(provider, Arc::new(KeyringGuard::in_memory()), policy)
    }

    fn msg() -> Arc<dyn Msg> {
        Arc::new(AnyMsg::new(msg_type::INSERT_HEADERS, vec![0xaa]))
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let provider = Arc::new(FlakyProvider::new(2, "connection refused", 0));
        let engine = engine(provider.clone());

        let response = engine
            .reliably_send_msg(&Cancellation::new(), msg(), &[], &[])
            .await
            .unwrap()
            .expect("included transaction");
        assert_eq!(response.height, 10);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_is_config_invalid() {
        let engine = engine(Arc::new(FlakyProvider::new(0, "", 0)));
        engine.policy().set_attempts(0);
        let err = engine
            .send_msg_to_mempool(&Cancellation::new(), msg())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::ConfigInvalid(_)));
    }

    #[tokio::test]
    async fn test_expected_error_short_circuits() {
        let provider = Arc::new(FlakyProvider::new(u32::MAX, "tx already in mempool", 0));
        let engine = engine(provider.clone());

        let result = engine
            .reliably_send_msg(&Cancellation::new(), msg(), &[sdk::ERR_TX_IN_MEMPOOL_CACHE], &[])
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_delay() {
        let provider = Arc::new(FlakyProvider::new(u32::MAX, "timeout", 0));
        let engine = engine(provider.clone());
        engine.policy().set_delay(Duration::from_secs(60));

        let ctx = Cancellation::new();
        ctx.cancel_after(Duration::from_secs(1));
        let err = engine.reliably_send_msg(&ctx, msg(), &[], &[]).await.unwrap_err();
        assert!(matches!(err, SubmitError::Cancelled));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&SubmitError::Cancelled), "cancelled");
        assert_eq!(outcome_label(&SubmitError::EmptyBatch), "rejected");
    }
}
