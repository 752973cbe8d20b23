//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::resilience::retries::{DEFAULT_ATTEMPTS, DEFAULT_DELAY_MS, DEFAULT_MAX_DELAY_MS};

/// Root configuration for the chain client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Name of the signing key in the keyring.
    pub key: String,

    /// Chain ID transactions are signed for.
    pub chain_id: String,

    /// Tendermint RPC endpoint.
    pub rpc_addr: String,

    /// gRPC endpoint.
    pub grpc_addr: String,

    /// Bech32 account prefix.
    pub account_prefix: String,

    /// Keyring backend (`test`, `file`, `os`, `memory`).
    pub keyring_backend: String,

    /// Multiplier applied to simulated gas.
    pub gas_adjustment: f64,

    /// Gas prices, e.g. `0.01lrz`.
    pub gas_prices: String,

    /// Directory holding the keyring.
    pub key_directory: PathBuf,

    /// Verbose provider logging.
    pub debug: bool,

    /// RPC timeout in seconds.
    pub timeout_secs: u64,

    /// Block inclusion timeout in seconds (0 = provider default).
    pub block_timeout_secs: u64,

    /// Provider output format (`json` or `text`).
    pub output_format: String,

    /// Sign mode (`direct` or `amino-json`).
    pub sign_mode: String,

    /// Retry policy applied to every submission.
    pub retry: RetryConfig,

    /// Read-only query client settings.
    pub query: QueryConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn block_timeout(&self) -> Duration {
        Duration::from_secs(self.block_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            key: "node0".to_string(),
            chain_id: "chain-test".to_string(),
            rpc_addr: "http://localhost:26657".to_string(),
            grpc_addr: "https://localhost:9090".to_string(),
            account_prefix: "lrz".to_string(),
            keyring_backend: "test".to_string(),
            gas_adjustment: 1.2,
            gas_prices: "0.01lrz".to_string(),
            key_directory: default_home(),
            debug: true,
            timeout_secs: 20,
            block_timeout_secs: 0,
            output_format: "json".to_string(),
            sign_mode: "direct".to_string(),
            retry: RetryConfig::default(),
            query: QueryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// `$HOME/.lorenzo`, or `.lorenzo` when no home directory is set.
fn default_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".lorenzo")
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total broadcast attempts per submission.
    pub attempts: u32,

    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,

    /// Surface only the last error when attempts run out.
    pub last_error_only: bool,

    /// Double the delay after each failed attempt.
    pub backoff: bool,

    /// Upper bound on the backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
            last_error_only: true,
            backoff: false,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Query client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Tendermint RPC endpoint used for queries.
    pub rpc_addr: String,

    /// Per-query timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            rpc_addr: "http://localhost:26657".to_string(),
            timeout_secs: 20,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.key, "node0");
        assert_eq!(config.account_prefix, "lrz");
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.block_timeout(), Duration::ZERO);
        assert!(config.key_directory.ends_with(".lorenzo"));
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay_ms, 400);
        assert!(config.retry.last_error_only);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            chain_id = "lorenzo_8329-1"

            [retry]
            attempts = 8

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_id, "lorenzo_8329-1");
        assert_eq!(config.retry.attempts, 8);
        assert_eq!(config.retry.delay_ms, 400);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.query.timeout_secs, 20);
    }
}
