//! Chain event types.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Event type of a BTC staking record creation (mint).
pub const EVENT_TYPE_MINT: &str = "lorenzo.btcstaking.v1.EventBTCStakingCreated";
/// Event type of a burn request.
pub const EVENT_TYPE_BURN: &str = "lorenzo.btcstaking.v1.EventBurnCreated";
/// Human-readable part of account addresses.
pub const BECH32_PREFIX_ACC_ADDR: &str = "lrz";

/// Decimal places of the source (BTC) denomination.
pub const SOURCE_DECIMALS: u32 = 8;
/// Decimal places of the minted denomination.
pub const TARGET_DECIMALS: u32 = 18;

/// A key/value attribute of an ABCI event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub index: bool,
}

/// A raw ABCI event, as found in block and transaction results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new<K, V>(kind: impl Into<String>, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind: kind.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| EventAttribute {
                    key: key.into(),
                    value: value.into(),
                    index: false,
                })
                .collect(),
        }
    }

    /// Value of the last attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// A token amount with its denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "decimal_u256")]
    pub amount: U256,
}

impl Coin {
    pub fn new(amount: U256, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A BTC deposit that mints tokens on the destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    /// BTC transaction hash, hex in display (reversed) byte order.
    pub tx_hash: String,
    /// Amount in 18-decimal units.
    ///
    /// Bounded to 256 bits: a record whose rescaled amount does not fit, or
    /// whose amount carries a sign, is rejected as `InvalidAmount`.
    #[serde(with = "decimal_u256")]
    pub amount: U256,
    /// Checksummed recipient address.
    pub mint_to_addr: String,
    pub btc_receiver_name: String,
    pub btc_receiver_addr: String,
    /// Agent the deposit was made through (newer records only).
    pub agent_id: Option<u64>,
    /// Destination chain (newer records only).
    pub chain_id: Option<u64>,
}

/// A request to burn tokens and withdraw BTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnEvent {
    pub amount: Coin,
    pub btc_target_address: String,
    /// Checksummed signer address.
    pub signer: String,
}

/// JSON payload of the mint event's `record` attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct MintRecordValue {
    /// Base64 transaction hash.
    pub tx_hash: String,
    /// Base-10 amount in 8-decimal units.
    pub amount: String,
    /// Base64 recipient address bytes.
    pub mint_to_addr: String,
    #[serde(default)]
    pub btc_receiver_name: String,
    #[serde(default)]
    pub btc_receiver_addr: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub agent_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub chain_id: Option<u64>,
}

/// Errors raised while decoding chain events.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid event attributes, missing {0} key")]
    MissingField(&'static str),

    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error("invalid base64 in {field}: {source}")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid hash length: got {0} bytes, want 32")]
    InvalidHashLength(usize),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid coin: {0:?}")]
    InvalidCoin(String),

    #[error("decoding bech32 address failed: {0}")]
    Bech32(String),

    #[error("invalid bech32 prefix: expected {expected}, got {found}")]
    WrongPrefix { expected: &'static str, found: String },
}

/// Integers ride in JSON as decimal strings; protobuf JSON may also use bare numbers.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// `U256` as a base-10 string.
pub(crate) mod decimal_u256 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_decimal(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid integer {text:?}")))
    }
}

/// Strict base-10 parse: digits only, no sign, no separators.
pub(crate) fn parse_decimal(text: &str) -> Option<U256> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(text, 10).ok()
}
