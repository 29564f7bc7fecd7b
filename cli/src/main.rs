//! chaintransport CLI — query a DAPI node through the transport adapter.
//!
//! Usage:
//! ```bash
//! # Node status and chain tip
//! chaintransport status
//! chaintransport height --seed 127.0.0.1:3000
//!
//! # Address and transaction lookups
//! chaintransport address yXdxAYfK8eJgQmHpUzMaKEBhqwKQWKSezS
//! chaintransport tx 9b0fc922...fdd5
//!
//! # Broadcast a signed transaction
//! chaintransport send 0200... --instant-send
//!
//! # List registered backends
//! chaintransport backends
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use chaintransport_core::{Outcome, Transporter, DEFAULT_BACKEND};
use chaintransport_dapi::{registry, DapiConfig, SeedEndpoint};

#[derive(Parser)]
#[command(
    name = "chaintransport",
    about = "Query a DAPI node through the chaintransport adapter",
    version
)]
struct Cli {
    /// Seed node `host:port` (repeatable, replaces the configured seeds)
    #[arg(long, global = true)]
    seed: Vec<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Retries on connection failures
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// JSON file holding a DAPI config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Node status
    Status,

    /// Best block height
    Height,

    /// Address summary
    Address {
        address: String,
    },

    /// Unspent outputs of an address
    Utxo {
        address: String,
    },

    /// Transaction by id
    Tx {
        txid: String,
    },

    /// Broadcast a raw transaction (hex)
    Send {
        rawtx: String,
        /// Request InstantSend locking
        #[arg(long)]
        instant_send: bool,
    },

    /// List registered backends
    Backends,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "resolved DAPI config");
    let registry = registry(config);
    let transporter = Transporter::new(DEFAULT_BACKEND, &registry);

    let outcome = match cli.command {
        Commands::Backends => {
            for name in registry.names() {
                let marker = if name == DEFAULT_BACKEND { " (default)" } else { "" };
                println!("{name}{marker}");
            }
            return Ok(());
        }
        _ if !transporter.is_valid() => bail!("DAPI backend could not be constructed"),
        Commands::Status => transporter.get_status().await?,
        Commands::Height => transporter.get_best_block_height().await?,
        Commands::Address { address } => transporter.get_address_summary(&address).await?,
        Commands::Utxo { address } => transporter.get_utxo(&address).await?,
        Commands::Tx { txid } => transporter.get_transaction(&txid).await?,
        Commands::Send { rawtx, instant_send } => {
            transporter.send_raw_transaction(&rawtx, instant_send).await?
        }
    };

    let failed = outcome.is_failed();
    println!("{}", serde_json::to_string_pretty(&render(outcome))?);
    if failed {
        if let Some(reason) = transporter.unreachable_reason() {
            eprintln!("Transporter unable to connect: {reason}");
        }
        process::exit(1);
    }
    Ok(())
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<DapiConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => DapiConfig::default(),
    };
    if !cli.seed.is_empty() {
        config.seeds = cli.seed.iter().map(SeedEndpoint::new).collect();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<DapiConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn render(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Data(data) => json!({ "data": data }),
        Outcome::Unavailable => json!({ "unavailable": true }),
        Outcome::Failed(err) => json!({ "failed": err.to_string() }),
    }
}
