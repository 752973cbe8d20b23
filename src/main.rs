//! Lorenzo client CLI.
//!
//! Offline helpers around the client library: decode mint and burn events
//! captured from the chain, and validate client configuration files.
//!
//! ```text
//! lorenzo-cli decode-mint event.json
//! lorenzo-cli decode-burn event.json
//! lorenzo-cli check-config client.toml
//! lorenzo-cli --config client.toml decode-mint event.json
//! ```
//!
//! Event files hold one ABCI event as JSON:
//! `{"type": "...", "attributes": [{"key": "...", "value": "..."}]}`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lorenzo_client::config::{load_config, ObservabilityConfig};
use lorenzo_client::event::{decode_burn_event, decode_mint_event, Event};
use lorenzo_client::observability::init_logging;

#[derive(Parser)]
#[command(name = "lorenzo-cli")]
#[command(about = "Offline tools for the Lorenzo chain client", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Client config whose `observability` section and `debug` flag drive logging
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a BTC staking (mint) event
    DecodeMint { file: PathBuf },
    /// Decode a burn event
    DecodeBurn { file: PathBuf },
    /// Load and validate a client configuration file
    CheckConfig { file: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::CheckConfig { file } => Some(file.as_path()),
        _ => cli.config.as_deref(),
    };
    let config = config_path.map(load_config).transpose()?;
    match &config {
        Some(config) => init_logging(&config.observability, config.debug || cli.verbose),
        None => init_logging(&ObservabilityConfig::default(), cli.verbose),
    };

    match cli.command {
        Commands::DecodeMint { file } => {
            let event = read_event(&file)?;
            let mint = decode_mint_event(&event)?;
            println!("{}", serde_json::to_string_pretty(&mint)?);
        }
        Commands::DecodeBurn { file } => {
            let event = read_event(&file)?;
            let burn = decode_burn_event(&event)?;
            println!("{}", serde_json::to_string_pretty(&burn)?);
        }
        Commands::CheckConfig { file } => {
            let config = match config {
                Some(config) => config,
                None => load_config(&file)?,
            };
            tracing::info!(
                path = %file.display(),
                chain_id = %config.chain_id,
                timeout = ?config.timeout(),
                block_timeout = ?config.block_timeout(),
                retry_attempts = config.retry.attempts,
                "Configuration is valid"
            );
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn read_event(path: &Path) -> Result<Event, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let event: Event = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        event_type = %event.kind,
        attributes = event.attributes.len(),
        "Event loaded"
    );
    Ok(event)
}
