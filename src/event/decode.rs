//! Decoding of raw chain events into typed domain events.

use alloy::primitives::{hex, Address, U256};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use bech32::primitives::decode::CheckedHrpstring;
use bech32::Bech32;

use crate::event::coin::parse_coin;
use crate::event::types::{
    parse_decimal, BurnEvent, Coin, DecodeError, Event, MintEvent, MintRecordValue,
    BECH32_PREFIX_ACC_ADDR, EVENT_TYPE_BURN, EVENT_TYPE_MINT, SOURCE_DECIMALS, TARGET_DECIMALS,
};
use crate::observability::metrics;

const HASH_SIZE: usize = 32;

/// A decoded event of a known type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    Mint(MintEvent),
    Burn(BurnEvent),
}

/// Decode `event` if its type is one this crate understands.
pub fn decode_event(event: &Event) -> Option<Result<ChainEvent, DecodeError>> {
    match event.kind.as_str() {
        EVENT_TYPE_MINT => Some(decode_mint_event(event).map(ChainEvent::Mint)),
        EVENT_TYPE_BURN => Some(decode_burn_event(event).map(ChainEvent::Burn)),
        _ => None,
    }
}

/// Decode a mint event from its `record` attribute.
pub fn decode_mint_event(event: &Event) -> Result<MintEvent, DecodeError> {
    let result = mint_from_record(event);
    metrics::record_event_decoded("mint", result.is_ok());
    result
}

/// Decode a burn event from its `amount`, `btc_target_address` and `signer` attributes.
pub fn decode_burn_event(event: &Event) -> Result<BurnEvent, DecodeError> {
    let result = burn_from_attributes(event);
    metrics::record_event_decoded("burn", result.is_ok());
    result
}

fn mint_from_record(event: &Event) -> Result<MintEvent, DecodeError> {
    let record = event
        .attribute("record")
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::MissingField("record"))?;

    let value: MintRecordValue = serde_json::from_str(record)?;

    let tx_hash = decode_tx_hash(&value.tx_hash)?;
    let amount = parse_decimal(&value.amount)
        .and_then(|amount| amount.checked_mul(mint_scale()))
        .ok_or_else(|| DecodeError::InvalidAmount(value.amount.clone()))?;
    let mint_to_bytes = BASE64_STANDARD
        .decode(&value.mint_to_addr)
        .map_err(|source| DecodeError::Base64 {
            field: "mint_to_addr",
            source,
        })?;

    Ok(MintEvent {
        tx_hash,
        amount,
        mint_to_addr: bytes_to_address(&mint_to_bytes).to_checksum(None),
        btc_receiver_name: value.btc_receiver_name,
        btc_receiver_addr: value.btc_receiver_addr,
        agent_id: value.agent_id,
        chain_id: value.chain_id,
    })
}

fn burn_from_attributes(event: &Event) -> Result<BurnEvent, DecodeError> {
    let mut amount = None;
    let mut btc_target_address = None;
    let mut signer = None;

    for attr in &event.attributes {
        match attr.key.as_str() {
            "amount" => amount = Some(decode_coin_attribute(&attr.value)?),
            "btc_target_address" => btc_target_address = Some(trim_quotes(&attr.value).to_string()),
            "signer" => signer = Some(decode_signer(trim_quotes(&attr.value))?),
            _ => {}
        }
    }

    Ok(BurnEvent {
        amount: amount.ok_or(DecodeError::MissingField("amount"))?,
        btc_target_address: btc_target_address
            .ok_or(DecodeError::MissingField("btc_target_address"))?,
        signer: signer.ok_or(DecodeError::MissingField("signer"))?,
    })
}

/// 10^(18-8): rescales 8-decimal source units to 18-decimal target units.
fn mint_scale() -> U256 {
    U256::from(10u64).pow(U256::from(TARGET_DECIMALS - SOURCE_DECIMALS))
}

/// Base64 hash bytes rendered as hex in display order (byte-reversed).
fn decode_tx_hash(encoded: &str) -> Result<String, DecodeError> {
    let mut bytes = BASE64_STANDARD
        .decode(encoded)
        .map_err(|source| DecodeError::Base64 {
            field: "tx_hash",
            source,
        })?;
    if bytes.len() != HASH_SIZE {
        return Err(DecodeError::InvalidHashLength(bytes.len()));
    }
    bytes.reverse();
    Ok(hex::encode(bytes))
}

/// Emitters have published the coin both as a JSON object and as a quoted coin string.
fn decode_coin_attribute(value: &str) -> Result<Coin, DecodeError> {
    match serde_json::from_str::<Coin>(value) {
        Ok(coin) => Ok(coin),
        Err(_) => parse_coin(trim_quotes(value)),
    }
}

fn decode_signer(value: &str) -> Result<String, DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::Bech32("must provide a non empty address".to_string()));
    }
    // Account addresses use the original bech32 checksum; bech32m is rejected.
    let checked = CheckedHrpstring::new::<Bech32>(value)
        .map_err(|e| DecodeError::Bech32(e.to_string()))?;
    let prefix = checked.hrp().to_lowercase();
    if prefix != BECH32_PREFIX_ACC_ADDR {
        return Err(DecodeError::WrongPrefix {
            expected: BECH32_PREFIX_ACC_ADDR,
            found: prefix,
        });
    }
    let bytes: Vec<u8> = checked.byte_iter().collect();
    Ok(bytes_to_address(&bytes).to_checksum(None))
}

/// Right-aligns `bytes` into 20 bytes, keeping the last 20 when longer.
fn bytes_to_address(bytes: &[u8]) -> Address {
    let mut out = [0u8; 20];
    let tail = &bytes[bytes.len().saturating_sub(20)..];
    out[20 - tail.len()..].copy_from_slice(tail);
    Address::from(out)
}

fn trim_quotes(value: &str) -> &str {
    value.trim_matches('"')
}
