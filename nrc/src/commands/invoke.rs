use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::debug;

use crate::address::Address;
use crate::contract::{Argument, Environment, WitnessSet};

/// Run one contract call and print its receipt as JSON
pub fn run(config_path: &Path, method: &str, args: &[String], height: u64, signers: &[String]) -> Result<()> {
    let args = args
        .iter()
        .map(|a| {
            a.parse::<Argument>()
                .map_err(|e| anyhow!("Invalid argument '{}': {}", a, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let signers = signers
        .iter()
        .map(|s| {
            s.parse::<Address>()
                .map_err(|e| anyhow!("Invalid signer '{}': {}", s, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut contract = super::open_contract(config_path)?;
    let witnesses = WitnessSet::new(signers);
    let env = Environment::new(height, &witnesses);

    debug!(method, height, argc = args.len(), "Invoking");
    let receipt = contract
        .invoke(&env, method, &args)
        .with_context(|| format!("Call '{}' failed", method))?;

    let json = serde_json::to_string_pretty(&receipt).context("Failed to serialize receipt")?;
    println!("{}", json);

    Ok(())
}
