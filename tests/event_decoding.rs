//! Event decoding against events shaped as the chain emits them.

use alloy::primitives::U256;
use lorenzo_client::event::{decode_event, parse_coin, ChainEvent, DecodeError, Event};
use serde_json::json;

const TX_HASH_B64: &str = "oKGio6SlpqeoqaqrrK2ur7CxsrO0tba3uLm6u7y9vr8=";
const MINT_TO_B64: &str = "P3qcDlstQeimxLLx0OnIt6b15NM=";

/// Mint event as the chain emits it: the record attribute holds a JSON string.
fn mint_event_json() -> String {
    let record = json!({
        "tx_hash": TX_HASH_B64,
        "amount": "250000000",
        "mint_to_addr": MINT_TO_B64,
        "btc_receiver_name": "lorenzo",
        "btc_receiver_addr": "bc1qdm3jl7ut8hmfc3m5ct4t8hknl0nxmplrjcw2yk",
        "agent_id": "3",
        "chain_id": "56",
    });
    json!({
        "type": "lorenzo.btcstaking.v1.EventBTCStakingCreated",
        "attributes": [
            {"key": "record", "value": record.to_string(), "index": true},
            {"key": "msg_index", "value": "0", "index": true},
        ],
    })
    .to_string()
}

const BURN_EVENT: &str = r#"{
    "type": "lorenzo.btcstaking.v1.EventBurnCreated",
    "attributes": [
        {"key": "signer", "value": "\"lrz18aafcrjm94q73fkyktcap6wgk7n0texnkv4q2n\""},
        {"key": "btc_target_address", "value": "\"bc1qtarget0000\""},
        {"key": "amount", "value": "{\"denom\":\"stBTC\",\"amount\":\"1000000000000000000\"}"}
    ]
}"#;

const RECIPIENT: &str = "3f7a9c0e5b2d41e8a6c4b2f1d0e9c8b7a6f5e4d3";

#[test]
fn test_mint_event_from_chain_json() {
    let event: Event = serde_json::from_str(&mint_event_json()).unwrap();
    let Some(Ok(ChainEvent::Mint(mint))) = decode_event(&event) else {
        panic!("expected a decoded mint event");
    };

    assert_eq!(
        mint.tx_hash,
        "bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0afaeadacabaaa9a8a7a6a5a4a3a2a1a0"
    );
    assert_eq!(
        mint.amount,
        U256::from_str_radix("2500000000000000000", 10).unwrap()
    );
    assert_eq!(mint.mint_to_addr.to_lowercase(), format!("0x{RECIPIENT}"));
    assert_ne!(mint.mint_to_addr, mint.mint_to_addr.to_lowercase());
    assert_eq!(mint.btc_receiver_name, "lorenzo");
    assert_eq!(mint.agent_id, Some(3));
    assert_eq!(mint.chain_id, Some(56));
}

#[test]
fn test_legacy_mint_record_without_metadata() {
    let record = json!({"tx_hash": TX_HASH_B64, "amount": "1", "mint_to_addr": MINT_TO_B64});
    let event = Event::new(
        "lorenzo.btcstaking.v1.EventBTCStakingCreated",
        [("record", record.to_string())],
    );
    let Some(Ok(ChainEvent::Mint(mint))) = decode_event(&event) else {
        panic!("expected a decoded mint event");
    };
    assert_eq!(mint.amount, U256::from(10_000_000_000u64));
    assert_eq!(mint.agent_id, None);
    assert!(mint.btc_receiver_addr.is_empty());
}

#[test]
fn test_burn_event_from_chain_json() {
    let event: Event = serde_json::from_str(BURN_EVENT).unwrap();
    let Some(Ok(ChainEvent::Burn(burn))) = decode_event(&event) else {
        panic!("expected a decoded burn event");
    };

    assert_eq!(burn.amount.denom, "stBTC");
    assert_eq!(burn.amount.to_string(), "1000000000000000000stBTC");
    assert_eq!(burn.btc_target_address, "bc1qtarget0000");
    assert_eq!(burn.signer.to_lowercase(), format!("0x{RECIPIENT}"));
}

#[test]
fn test_burn_signer_with_foreign_prefix() {
    let event = Event::new(
        "lorenzo.btcstaking.v1.EventBurnCreated",
        [
            ("signer", "\"cosmos18aafcrjm94q73fkyktcap6wgk7n0texnvfnmf9\""),
            ("btc_target_address", "\"bc1q\""),
            ("amount", "\"5ulrz\""),
        ],
    );
    match decode_event(&event) {
        Some(Err(DecodeError::WrongPrefix { expected, found })) => {
            assert_eq!(expected, "lrz");
            assert_eq!(found, "cosmos");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_unknown_event_is_skipped() {
    let event = Event::new("coin_received", [("amount", "5ulrz")]);
    assert!(decode_event(&event).is_none());
}

#[test]
fn test_missing_record_message() {
    let event = Event::new(
        "lorenzo.btcstaking.v1.EventBTCStakingCreated",
        [("msg_index", "0")],
    );
    let err = decode_event(&event).unwrap().unwrap_err();
    assert_eq!(err.to_string(), "invalid event attributes, missing record key");
}

#[test]
fn test_parse_coin_display_round_trip() {
    let coin = parse_coin("42ulrz").unwrap();
    assert_eq!(coin.to_string(), "42ulrz");
}
