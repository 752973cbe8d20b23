//! Chain client facade.
//!
//! # Responsibilities
//! - Validate configuration before anything touches the provider
//! - Own the keyring guard, retry policy and submission engine
//! - Expose live retry-policy setters
//! - Stop the underlying provider on shutdown
//!
//! # Design Decisions
//! - The provider is injected; building one (RPC, signing) is its own concern
//! - The `memory` keyring backend skips the on-disk lock, every other backend
//!   guards the key directory with `keyring.lock`

use std::sync::Arc;

use crate::blockchain::keyring::{FileKeyringLock, KeyringGuard, KeyringLock, NoopKeyringLock};
use crate::blockchain::provider::ChainProvider;
use crate::blockchain::submit::SubmissionEngine;
use crate::blockchain::types::{ClientError, Msg, RelayerTxResponse, SubmitResult};
use crate::config::loader::ConfigError;
use crate::config::schema::{ClientConfig, RetryConfig};
use crate::config::validation::validate_config;
use crate::lifecycle::Cancellation;
use crate::resilience::classifier::Sentinel;
use crate::resilience::retries::RetryPolicy;

const MEMORY_KEYRING_BACKEND: &str = "memory";

/// Client for submitting messages to the chain.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    provider: Arc<dyn ChainProvider>,
    engine: SubmissionEngine,
}

impl Client {
    /// Create a client over `provider`.
    ///
    /// # Returns
    /// The client, or [`ClientError::Config`] if `config` fails validation.
    pub fn new(
        config: ClientConfig,
        provider: Arc<dyn ChainProvider>,
    ) -> Result<Self, ClientError> {
        let lock: Arc<dyn KeyringLock> = if config.keyring_backend == MEMORY_KEYRING_BACKEND {
            Arc::new(NoopKeyringLock)
        } else {
            Arc::new(FileKeyringLock::new(&config.key_directory))
        };
        Self::with_keyring_lock(config, provider, lock)
    }

    /// Create a client with an explicit keyring lock.
    pub fn with_keyring_lock(
        config: ClientConfig,
        provider: Arc<dyn ChainProvider>,
        lock: Arc<dyn KeyringLock>,
    ) -> Result<Self, ClientError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let policy = Arc::new(RetryPolicy::from_config(&config.retry));
        let guard = Arc::new(KeyringGuard::new(lock));
        let engine = SubmissionEngine::new(provider.clone(), guard, policy);

        tracing::info!(
            chain_id = %config.chain_id,
            rpc_addr = %config.rpc_addr,
            key = %config.key,
            keyring_backend = %config.keyring_backend,
            timeout = ?config.timeout(),
            retry_attempts = config.retry.attempts,
            retry_delay_ms = config.retry.delay_ms,
            "client initialized"
        );

        Ok(Self {
            config,
            provider,
            engine,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn engine(&self) -> &SubmissionEngine {
        &self.engine
    }

    pub fn retry_policy(&self) -> &Arc<RetryPolicy> {
        self.engine.policy()
    }

    pub fn set_retry_attempts(&self, attempts: u32) {
        self.retry_policy().set_attempts(attempts);
    }

    pub fn set_retry_delay(&self, milliseconds: u64) {
        self.retry_policy().set_delay_ms(milliseconds);
    }

    pub fn set_last_error_only(&self, last_error_only: bool) {
        self.retry_policy().set_last_error_only(last_error_only);
    }

    /// Apply a reloaded retry section; in-flight submissions pick it up on
    /// their next iteration.
    pub fn apply_retry_config(&self, retry: &RetryConfig) {
        tracing::info!(
            attempts = retry.attempts,
            delay_ms = retry.delay_ms,
            last_error_only = retry.last_error_only,
            backoff = retry.backoff,
            "Applying retry configuration"
        );
        self.retry_policy().apply(retry);
    }

    pub async fn send_msg_to_mempool(
        &self,
        ctx: &Cancellation,
        msg: Arc<dyn Msg>,
    ) -> SubmitResult<()> {
        self.engine.send_msg_to_mempool(ctx, msg).await
    }

    pub async fn send_msgs_to_mempool(
        &self,
        ctx: &Cancellation,
        msgs: &[Arc<dyn Msg>],
    ) -> SubmitResult<()> {
        self.engine.send_msgs_to_mempool(ctx, msgs).await
    }

    pub async fn reliably_send_msg(
        &self,
        ctx: &Cancellation,
        msg: Arc<dyn Msg>,
        expected_errors: &[Sentinel],
        unrecoverable_errors: &[Sentinel],
    ) -> SubmitResult<Option<RelayerTxResponse>> {
        self.engine
            .reliably_send_msg(ctx, msg, expected_errors, unrecoverable_errors)
            .await
    }

    pub async fn reliably_send_msgs(
        &self,
        ctx: &Cancellation,
        msgs: &[Arc<dyn Msg>],
        expected_errors: &[Sentinel],
        unrecoverable_errors: &[Sentinel],
    ) -> SubmitResult<Option<RelayerTxResponse>> {
        self.engine
            .reliably_send_msgs(ctx, msgs, expected_errors, unrecoverable_errors)
            .await
    }

    /// Stop the provider if it is still running.
    pub async fn stop(&self) -> Result<(), ClientError> {
        if !self.provider.is_running() {
            tracing::debug!("provider already stopped");
            return Ok(());
        }
        self.provider.stop().await?;
        tracing::info!("client stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("chain_id", &self.config.chain_id)
            .field("rpc_addr", &self.config.rpc_addr)
            .field("key", &self.config.key)
            .field("engine", &self.engine)
            .finish()
    }
}
