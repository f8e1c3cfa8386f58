// Copyright (c) 2024 Botho Foundation

//! The NRC ledger engine.
//!
//! Components, leaves first:
//!
//! - [`emission`]: advances the logical block counter at most once per chain
//!   height and mints new supply into the pool up to the cap.
//! - [`settlement`]: splits a closed block's credit evenly among its
//!   reporters and rolls the remainder forward.
//! - [`ticket`]: prepaid per-block fees that fund future credit pools and
//!   grant journal read access.
//! - [`journal`]: append-only per-block geolocation reports.
//! - [`balance`]: transfers, pool disbursement and balance reads.
//! - [`dispatch`]: routes `(method, args)` to the above, always running the
//!   emission step first.
//!
//! Components hold no state of their own. Each call stages its reads and
//! writes in a [`ContractState`] and commits only if every precondition
//! passed.

pub mod balance;
pub mod dispatch;
pub mod emission;
pub mod journal;
pub mod settlement;
pub mod ticket;

mod state;

pub use self::dispatch::{Argument, Call, Contract, Receipt, ReturnValue};
pub use self::state::ContractState;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::address::{Address, AddressError};
use crate::store::{StorageKey, StoreError};

pub const TOKEN_NAME: &str = "NEO Robot Communication";
pub const TOKEN_SYMBOL: &str = "NRC";
pub const TOKEN_DECIMALS: u64 = 0;

pub const DEFAULT_INITIAL_SUPPLY: u64 = 50_000_000;
pub const DEFAULT_MAXIMUM_SUPPLY: u64 = 100_000_000;
pub const DEFAULT_GENERATION_PER_BLOCK: u64 = 100;
pub const DEFAULT_FEE_PER_BLOCK: u64 = 10;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Contract is not deployed")]
    NotDeployed,

    #[error("Contract is already deployed")]
    AlreadyDeployed,

    #[error("Authorization denied for {0}")]
    AuthorizationDenied(Address),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("Insufficient pool supply: available {available}, required {required}")]
    InsufficientSupply { available: u64, required: u64 },

    #[error("Ticket for {0} is expired or missing")]
    TicketExpiredOrMissing(Address),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Arithmetic overflow at {0}")]
    Overflow(StorageKey),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<AddressError> for ContractError {
    fn from(e: AddressError) -> Self {
        ContractError::Validation(e.to_string())
    }
}

/// Fixed economic parameters of a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractParams {
    /// Supply minted into the pool at deploy time
    pub initial_supply: u64,
    /// Hard cap on total supply
    pub maximum_supply: u64,
    /// Supply minted into the pool per logical block
    pub generation_per_block: u64,
    /// Ticket price per logical block
    pub fee_per_block: u64,
    /// Identity allowed to deploy and to disburse from the pool
    pub admin: Address,
}

impl ContractParams {
    pub fn new(admin: Address) -> Self {
        Self {
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            maximum_supply: DEFAULT_MAXIMUM_SUPPLY,
            generation_per_block: DEFAULT_GENERATION_PER_BLOCK,
            fee_per_block: DEFAULT_FEE_PER_BLOCK,
            admin,
        }
    }
}

/// Answers whether the current call proves control of an address.
pub trait Signer {
    fn is_authorized(&self, address: &Address) -> bool;
}

impl<F> Signer for F
where
    F: Fn(&Address) -> bool,
{
    fn is_authorized(&self, address: &Address) -> bool {
        self(address)
    }
}

/// The set of addresses whose witnesses accompany a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessSet {
    addresses: HashSet<Address>,
}

impl WitnessSet {
    pub fn new<I: IntoIterator<Item = Address>>(addresses: I) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl Signer for WitnessSet {
    fn is_authorized(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }
}

/// Black-box inputs of one call, supplied by the host.
pub struct Environment<'a> {
    /// Current chain height
    pub height: u64,
    /// Authorization oracle for this call
    pub signer: &'a dyn Signer,
}

impl<'a> Environment<'a> {
    pub fn new(height: u64, signer: &'a dyn Signer) -> Self {
        Self { height, signer }
    }
}

/// One journal entry as returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub block: u64,
    pub index: u64,
    pub timestamp: u64,
    pub reporter: Address,
    #[serde(with = "hex_bytes")]
    pub location: Vec<u8>,
}

/// Events emitted for off-chain observers.
///
/// `None` on either side of a transfer is the pool or a credit escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: u64,
    },
    GeoRecord(GeoRecord),
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Fail with `AuthorizationDenied` unless the signer controls `address`.
pub(crate) fn require_witness(signer: &dyn Signer, address: &Address) -> Result<(), ContractError> {
    if signer.is_authorized(address) {
        Ok(())
    } else {
        tracing::debug!(%address, "No privilege");
        Err(ContractError::AuthorizationDenied(*address))
    }
}
