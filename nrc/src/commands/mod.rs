//! CLI command implementations.
//!
//! These modules implement the user-facing CLI commands and legitimately
//! use stdout for output.

#![allow(clippy::print_stdout)]

pub mod dump;
pub mod init;
pub mod invoke;
pub mod status;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::contract::Contract;
use crate::store::LmdbStore;

/// Load the config and open the contract over its LMDB state.
fn open_contract(config_path: &Path) -> Result<Contract<LmdbStore>> {
    let config = Config::load(config_path).context("No config found. Run 'nrc init' first.")?;
    let params = config.params()?;

    let state_dir = config.state_dir(config_path);
    let store = LmdbStore::open(&state_dir)
        .with_context(|| format!("Failed to open state at {}", state_dir.display()))?;

    Ok(Contract::new(store, params))
}
