//! Chain event decoding.
//!
//! # Data Flow
//! ```text
//! ABCI event (type + string attributes)
//!     → decode.rs (dispatch on event type)
//!     → mint: JSON `record` → base64 hash/address → 18-decimal amount
//!     → burn: coin amount + bech32 signer → checksummed address
//!     → MintEvent / BurnEvent
//! ```
//!
//! # Design Decisions
//! - Amounts are `U256`; the 8 → 18 decimal rescale is checked
//! - Addresses are rendered EIP-55 checksummed
//! - Unknown event types are skipped, not errors

pub mod coin;
pub mod decode;
pub mod types;

pub use coin::parse_coin;
pub use decode::{decode_burn_event, decode_event, decode_mint_event, ChainEvent};
pub use types::{BurnEvent, Coin, DecodeError, Event, EventAttribute, MintEvent};
