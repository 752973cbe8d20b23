//! Coin-string parsing (`"100ulrz"`).

use crate::event::types::{parse_decimal, Coin, DecodeError};

const DENOM_MIN_LEN: usize = 3;
const DENOM_MAX_LEN: usize = 128;

/// Parse `<amount><denom>`, optionally with whitespace between the two.
///
/// Denominations start with a letter and continue with letters, digits or
/// one of `/:._-`, 3 to 128 characters in total.
pub fn parse_coin(text: &str) -> Result<Coin, DecodeError> {
    let invalid = || DecodeError::InvalidCoin(text.to_string());
    let trimmed = text.trim();

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (amount, rest) = trimmed.split_at(split);
    let denom = rest.trim_start();

    if !is_valid_denom(denom) {
        return Err(invalid());
    }
    let amount = parse_decimal(amount).ok_or_else(invalid)?;

    Ok(Coin::new(amount, denom))
}

fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&denom.len())
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}
