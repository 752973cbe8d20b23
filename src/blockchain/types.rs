//! Chain-facing types and error definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::keyring::GuardError;
use crate::config::loader::ConfigError;

/// An application-level chain message.
///
/// The engine never inspects a message beyond handing it to the provider;
/// encoding is the caller's concern.
pub trait Msg: fmt::Debug + Send + Sync {
    /// Fully-qualified protobuf type URL (e.g. `/lorenzo.plan.v1.MsgClaims`).
    fn type_url(&self) -> &str;

    /// Protobuf-encoded message body.
    fn value(&self) -> &[u8];
}

/// A pre-encoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyMsg {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl AnyMsg {
    pub fn new(type_url: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }
}

impl Msg for AnyMsg {
    fn type_url(&self) -> &str {
        &self.type_url
    }

    fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Type URLs of the message kinds the chain accepts.
pub mod msg_type {
    pub const INSERT_HEADERS: &str = "/lorenzo.btclightclient.v1.MsgInsertHeaders";
    pub const CREATE_BTC_STAKING: &str = "/lorenzo.btcstaking.v1.MsgCreateBTCStaking";
    pub const ADD_AGENT: &str = "/lorenzo.agent.v1.MsgAddAgent";
    pub const EDIT_AGENT: &str = "/lorenzo.agent.v1.MsgEditAgent";
    pub const REMOVE_AGENT: &str = "/lorenzo.agent.v1.MsgRemoveAgent";
    pub const UPGRADE_PLAN: &str = "/lorenzo.plan.v1.MsgUpgradePlan";
    pub const CREATE_PLAN: &str = "/lorenzo.plan.v1.MsgCreatePlan";
    pub const SET_MERKLE_ROOT: &str = "/lorenzo.plan.v1.MsgSetMerkleRoot";
    pub const CLAIMS: &str = "/lorenzo.plan.v1.MsgClaims";
    pub const CREATE_YAT: &str = "/lorenzo.plan.v1.MsgCreateYAT";
    pub const UPDATE_PLAN_STATUS: &str = "/lorenzo.plan.v1.MsgUpdatePlanStatus";
    pub const SET_MINTER: &str = "/lorenzo.plan.v1.MsgSetMinter";
    pub const REMOVE_MINTER: &str = "/lorenzo.plan.v1.MsgRemoveMinter";
}

/// Hook the provider may call to override the signer of a message.
pub type SignerHook = fn(&str);

/// A message in the form the provider broadcasts.
#[derive(Debug, Clone)]
pub struct RelayerMessage {
    msg: Arc<dyn Msg>,
    signer_hook: SignerHook,
}

impl RelayerMessage {
    /// Wrap a message with a no-op signer override.
    pub fn new(msg: Arc<dyn Msg>) -> Self {
        Self {
            msg,
            signer_hook: |_| {},
        }
    }

    pub fn msg(&self) -> &dyn Msg {
        self.msg.as_ref()
    }

    pub fn type_url(&self) -> &str {
        self.msg.type_url()
    }

    pub fn set_signer(&self, signer: &str) {
        (self.signer_hook)(signer)
    }
}

/// An event emitted by an included transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerEvent {
    pub event_type: String,
    pub attributes: BTreeMap<String, String>,
}

/// Result of a broadcast transaction as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerTxResponse {
    pub height: i64,
    pub tx_hash: String,
    pub codespace: String,
    /// Zero on success; any other value is an application-level failure.
    pub code: u32,
    pub data: String,
    pub events: Vec<RelayerEvent>,
}

impl RelayerTxResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// An error reported by the chain provider, synchronously or via callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for ProviderError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for ProviderError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Errors surfaced by the submission engine.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No messages were supplied.
    #[error("empty message set provided")]
    EmptyBatch,

    /// The retry policy cannot drive a submission.
    #[error("invalid retry policy: {0}")]
    ConfigInvalid(String),

    /// The signing resource could not be acquired; never retried.
    #[error("signing resource unavailable: {0}")]
    ResourceUnavailable(#[from] GuardError),

    /// Broadcast error matched the caller's unrecoverable set; never retried.
    #[error("{0}")]
    Unrecoverable(ProviderError),

    /// Attempts exhausted; the last broadcast error.
    #[error("{0}")]
    Transient(ProviderError),

    /// Attempts exhausted with last-error-only disabled; every broadcast error in order.
    #[error("all {attempts} attempts failed: {}", join_errors(.errors))]
    AttemptsExhausted {
        attempts: u32,
        errors: Vec<ProviderError>,
    },

    /// The completion callback delivered an error.
    #[error("{0}")]
    Callback(ProviderError),

    /// Broadcast succeeded but the transaction failed on chain.
    #[error("transaction failed with code: {code}")]
    TxFailed {
        code: u32,
        codespace: String,
        response: Box<RelayerTxResponse>,
    },

    /// The provider dropped the completion callback without invoking it.
    #[error("broadcast completion callback dropped without a result")]
    CallbackDropped,

    /// The caller's cancellation fired.
    #[error("submission cancelled")]
    Cancelled,
}

impl SubmitError {
    /// The transaction result carried by an on-chain failure.
    pub fn response(&self) -> Option<&RelayerTxResponse> {
        match self {
            SubmitError::TxFailed { response, .. } => Some(response),
            _ => None,
        }
    }
}

fn join_errors(errors: &[ProviderError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("#{}: {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Errors raised while constructing or stopping a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
