use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use nrc::{commands, config};

#[derive(Parser)]
#[command(name = "nrc")]
#[command(about = "Ticket-gated geolocation ledger with block-paced emission", long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.nrc/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config for a new ledger
    Init {
        /// Administrator address (40 hex characters)
        #[arg(long)]
        admin: String,
    },

    /// Run one contract method and print the receipt
    Invoke {
        /// Method name (deploy, transfer, postGeo, requestTicket, ...)
        method: String,

        /// Arguments: decimal integers, 0x-prefixed hex, or text. A numeric
        /// location is stored as its decimal text
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,

        /// Host chain height observed by this call
        #[arg(long)]
        height: u64,

        /// Address whose authorization accompanies the call (repeatable)
        #[arg(long = "signer")]
        signers: Vec<String>,
    },

    /// Show supply, block and accounting status
    Status,

    /// Print every stored key and value
    Dump,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => PathBuf::from(path),
        None => config::default_config_path()?,
    };

    match cli.command {
        Commands::Init { admin } => commands::init::run(&config_path, &admin),
        Commands::Invoke {
            method,
            args,
            height,
            signers,
        } => commands::invoke::run(&config_path, &method, &args, height, &signers),
        Commands::Status => commands::status::run(&config_path),
        Commands::Dump => commands::dump::run(&config_path),
    }
}
