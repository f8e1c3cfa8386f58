use anyhow::{anyhow, bail, Result};
use std::path::Path;
use tracing::info;

use crate::address::Address;
use crate::config::Config;

/// Run the init command
pub fn run(config_path: &Path, admin: &str) -> Result<()> {
    if Config::exists(config_path) {
        bail!(
            "Config already exists at {}\nUse a different --config path or delete the existing config.",
            config_path.display()
        );
    }

    let admin: Address = admin
        .parse()
        .map_err(|e| anyhow!("Invalid admin address '{}': {}", admin, e))?;

    let config = Config::new(&admin);
    config.save(config_path)?;

    info!("Ledger initialized at {}", config_path.display());
    println!("\nNRC ledger configuration created.");
    println!("Config saved to: {}", config_path.display());
    println!("State directory: {}", config.state_dir(config_path).display());
    println!("Administrator:   {}", admin);
    println!("\nNext steps:");
    println!(
        "  1. Run 'nrc invoke deploy --height 1 --signer {}' to deploy",
        admin
    );
    println!("  2. Run 'nrc status' to inspect the ledger");

    Ok(())
}
