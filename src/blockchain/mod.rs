//! Chain submission subsystem.
//!
//! # Data Flow
//! ```text
//! caller messages (Arc<dyn Msg>)
//!     → client.rs (validated config, live retry setters)
//!     → submit.rs (retry loop, error classification)
//!     → keyring.rs (exclusive keyring access per broadcast)
//!     → provider.rs (ChainProvider broadcast + inclusion callback)
//!     → RelayerTxResponse / SubmitError
//! ```
//!
//! # Constraints
//! - At most one broadcast holds the keyring at a time
//! - Keyring failures are never retried
//! - Never log key material

pub mod client;
pub mod keyring;
pub mod provider;
pub mod submit;
pub mod types;

pub use client::Client;
pub use keyring::{FileKeyringLock, GuardError, KeyringGuard, KeyringLock, NoopKeyringLock};
pub use provider::{ChainProvider, TxCallback};
pub use submit::SubmissionEngine;
pub use types::{
    msg_type, AnyMsg, ClientError, Msg, ProviderError, RelayerEvent, RelayerMessage,
    RelayerTxResponse, SubmitError, SubmitResult,
};
