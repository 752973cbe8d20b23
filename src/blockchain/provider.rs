//! Chain provider seam.
//!
//! The provider signs, broadcasts and tracks inclusion of transactions. This
//! crate only drives it; implementations live with the node tooling.

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{Msg, ProviderError, RelayerMessage, RelayerTxResponse};
use crate::lifecycle::Cancellation;

/// Completion callback registered with a broadcast.
pub type TxCallback = Box<dyn FnOnce(Result<RelayerTxResponse, ProviderError>) + Send + 'static>;

/// Broadcasts message batches to a chain mempool.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Broadcast `msgs` as one transaction.
    ///
    /// A synchronous `Err` means the transaction never reached the mempool and
    /// no callback will be invoked. On `Ok`, each callback is invoked at most
    /// once, possibly from another task, with the inclusion result.
    async fn send_messages_to_mempool(
        &self,
        ctx: &Cancellation,
        msgs: &[RelayerMessage],
        memo: &str,
        callbacks: Vec<TxCallback>,
    ) -> Result<(), ProviderError>;

    /// Whether the underlying RPC connection is running.
    fn is_running(&self) -> bool {
        true
    }

    /// Stop the underlying RPC connection.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Convert messages into provider form.
pub fn to_provider_msgs(msgs: &[Arc<dyn Msg>]) -> Vec<RelayerMessage> {
    msgs.iter().cloned().map(RelayerMessage::new).collect()
}
