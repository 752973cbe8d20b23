//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoints parse as URLs
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before a client is constructed

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

const OUTPUT_FORMATS: &[&str] = &["json", "text"];
const SIGN_MODES: &[&str] = &["direct", "amino-json"];

/// Check every semantic constraint on `config`.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "rpc_addr", &config.rpc_addr);
    check_url(&mut errors, "grpc_addr", &config.grpc_addr);
    check_url(&mut errors, "query.rpc_addr", &config.query.rpc_addr);

    if config.timeout_secs == 0 {
        errors.push(ValidationError::new("timeout_secs", "timeout must be positive"));
    }
    if config.query.timeout_secs == 0 {
        errors.push(ValidationError::new("query.timeout_secs", "timeout must be positive"));
    }
    if config.retry.attempts == 0 {
        errors.push(ValidationError::new("retry.attempts", "at least one attempt is required"));
    }
    if config.retry.backoff && config.retry.max_delay_ms < config.retry.delay_ms {
        errors.push(ValidationError::new(
            "retry.max_delay_ms",
            "must not be smaller than retry.delay_ms",
        ));
    }
    if !(config.gas_adjustment > 0.0) {
        errors.push(ValidationError::new("gas_adjustment", "must be positive"));
    }
    if config.account_prefix.is_empty() {
        errors.push(ValidationError::new("account_prefix", "must not be empty"));
    }
    if !OUTPUT_FORMATS.contains(&config.output_format.as_str()) {
        errors.push(ValidationError::new(
            "output_format",
            format!("unsupported format '{}'", config.output_format),
        ));
    }
    if !SIGN_MODES.contains(&config.sign_mode.as_str()) {
        errors.push(ValidationError::new(
            "sign_mode",
            format!("unsupported sign mode '{}'", config.sign_mode),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = Url::parse(value) {
        errors.push(ValidationError::new(field, format!("not correctly formatted: {}", e)));
    }
}
