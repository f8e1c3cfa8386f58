// Copyright (c) 2024 Botho Foundation

use anyhow::{anyhow, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::address::Address;
use crate::contract::{
    ContractParams, DEFAULT_FEE_PER_BLOCK, DEFAULT_GENERATION_PER_BLOCK, DEFAULT_INITIAL_SUPPLY,
    DEFAULT_MAXIMUM_SUPPLY,
};

/// Main configuration for an NRC ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub contract: ContractConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Administrator address (40 hex characters)
    pub admin: String,

    /// Supply minted into the pool at deploy time
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,

    /// Hard cap on total supply
    #[serde(default = "default_maximum_supply")]
    pub maximum_supply: u64,

    /// Supply minted per logical block
    #[serde(default = "default_generation_per_block")]
    pub generation_per_block: u64,

    /// Ticket price per logical block
    #[serde(default = "default_fee_per_block")]
    pub fee_per_block: u64,
}

fn default_initial_supply() -> u64 {
    DEFAULT_INITIAL_SUPPLY
}

fn default_maximum_supply() -> u64 {
    DEFAULT_MAXIMUM_SUPPLY
}

fn default_generation_per_block() -> u64 {
    DEFAULT_GENERATION_PER_BLOCK
}

fn default_fee_per_block() -> u64 {
    DEFAULT_FEE_PER_BLOCK
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State directory. Defaults to `state` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Create a new config with default economics for the given admin
    pub fn new(admin: &Address) -> Self {
        Self {
            contract: ContractConfig {
                admin: admin.to_hex(),
                initial_supply: DEFAULT_INITIAL_SUPPLY,
                maximum_supply: DEFAULT_MAXIMUM_SUPPLY,
                generation_per_block: DEFAULT_GENERATION_PER_BLOCK,
                fee_per_block: DEFAULT_FEE_PER_BLOCK,
            },
            storage: StorageConfig::default(),
        }
    }

    /// Validated contract parameters
    pub fn params(&self) -> Result<ContractParams> {
        let c = &self.contract;
        let admin: Address = c
            .admin
            .parse()
            .map_err(|e| anyhow!("Invalid admin address '{}': {}", c.admin, e))?;

        ensure!(c.initial_supply > 0, "initial_supply must be positive");
        ensure!(
            c.initial_supply <= c.maximum_supply,
            "initial_supply ({}) exceeds maximum_supply ({})",
            c.initial_supply,
            c.maximum_supply
        );

        Ok(ContractParams {
            initial_supply: c.initial_supply,
            maximum_supply: c.maximum_supply,
            generation_per_block: c.generation_per_block,
            fee_per_block: c.fee_per_block,
            admin,
        })
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Check if config file exists
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// State directory for a config loaded from `config_path`
    pub fn state_dir(&self, config_path: &Path) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| state_dir_from_config(config_path))
    }
}

/// Get the default config directory path
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".nrc"))
        .context("Could not determine home directory")
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join("config.toml"))
}

/// Get the state database directory from config file path
pub fn state_dir_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or(config_path)
        .join("state")
}
