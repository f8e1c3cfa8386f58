// Copyright (c) 2024 Botho Foundation

//! Method dispatch.
//!
//! Every method except `deploy` runs the emission step before it is even
//! looked up, so any successful call at a new chain height advances the
//! logical block. A call that fails for any reason commits nothing, the
//! emission step included.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use super::{
    balance, emission, journal, require_witness, ticket, ContractError, ContractParams,
    ContractState, Environment, Notification, Signer, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL,
};
use crate::address::Address;
use crate::store::Store;

/// One positional argument of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    Integer(i64),
    Bytes(Vec<u8>),
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Integer(value)
    }
}

impl From<&Address> for Argument {
    fn from(address: &Address) -> Self {
        Argument::Bytes(address.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Argument {
    fn from(bytes: &[u8]) -> Self {
        Argument::Bytes(bytes.to_vec())
    }
}

impl FromStr for Argument {
    type Err = ContractError;

    /// Decimal integers, `0x`-prefixed hex bytes, otherwise the text itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex_str) = s.strip_prefix("0x") {
            return hex::decode(hex_str)
                .map(Argument::Bytes)
                .map_err(|e| ContractError::Validation(format!("invalid hex argument: {e}")));
        }
        if let Ok(value) = s.parse::<i64>() {
            return Ok(Argument::Integer(value));
        }
        Ok(Argument::Bytes(s.as_bytes().to_vec()))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Integer(value) => write!(f, "{value}"),
            Argument::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// A parsed, well-typed method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf {
        address: Address,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    TransferFromPool {
        to: Address,
        amount: u64,
    },
    PostGeo {
        reporter: Address,
        location: Vec<u8>,
        timestamp: u64,
    },
    RequestGeo {
        requester: Address,
        n_blocks: u64,
    },
    RequestTicket {
        address: Address,
        n_blocks: u64,
    },
}

impl Call {
    pub fn parse(method: &str, args: &[Argument]) -> Result<Self, ContractError> {
        let args = Args { method, args };
        let call = match method {
            "name" => {
                args.arity(0)?;
                Call::Name
            }
            "symbol" => {
                args.arity(0)?;
                Call::Symbol
            }
            "decimals" => {
                args.arity(0)?;
                Call::Decimals
            }
            "totalSupply" => {
                args.arity(0)?;
                Call::TotalSupply
            }
            "balanceOf" => {
                args.arity(1)?;
                Call::BalanceOf {
                    address: args.address(0)?,
                }
            }
            "transfer" => {
                args.arity(3)?;
                Call::Transfer {
                    from: args.address(0)?,
                    to: args.address(1)?,
                    amount: args.integer(2)?,
                }
            }
            "transferFromPool" => {
                args.arity(2)?;
                Call::TransferFromPool {
                    to: args.address(0)?,
                    amount: args.integer(1)?,
                }
            }
            "postGeo" => {
                args.arity(3)?;
                Call::PostGeo {
                    reporter: args.address(0)?,
                    location: args.payload(1),
                    timestamp: args.non_negative(2)?,
                }
            }
            "requestGeo" => {
                args.arity(2)?;
                Call::RequestGeo {
                    requester: args.address(0)?,
                    n_blocks: args.integer(1)?,
                }
            }
            "requestTicket" => {
                args.arity(2)?;
                Call::RequestTicket {
                    address: args.address(0)?,
                    n_blocks: args.integer(1)?,
                }
            }
            _ => {
                debug!(method, "Unknown method");
                return Err(ContractError::UnknownMethod(method.to_string()));
            }
        };
        Ok(call)
    }
}

struct Args<'a> {
    method: &'a str,
    args: &'a [Argument],
}

impl<'a> Args<'a> {
    fn arity(&self, expected: usize) -> Result<(), ContractError> {
        if self.args.len() != expected {
            return Err(ContractError::Validation(format!(
                "{} takes {expected} argument(s), got {}",
                self.method,
                self.args.len()
            )));
        }
        Ok(())
    }

    fn bytes(&self, i: usize) -> Result<&'a [u8], ContractError> {
        let args: &'a [Argument] = self.args;
        match &args[i] {
            Argument::Bytes(bytes) => Ok(bytes),
            Argument::Integer(_) => Err(self.kind_error(i, "bytes")),
        }
    }

    fn address(&self, i: usize) -> Result<Address, ContractError> {
        Ok(Address::try_from(self.bytes(i)?)?)
    }

    /// Raw bytes, or the decimal text of an integer.
    fn payload(&self, i: usize) -> Vec<u8> {
        match &self.args[i] {
            Argument::Bytes(bytes) => bytes.clone(),
            Argument::Integer(value) => value.to_string().into_bytes(),
        }
    }

    /// Amounts and block counts: negative values read as zero, which every
    /// operation rejects as non-positive.
    fn integer(&self, i: usize) -> Result<u64, ContractError> {
        match &self.args[i] {
            Argument::Integer(value) => Ok(u64::try_from(*value).unwrap_or(0)),
            Argument::Bytes(_) => Err(self.kind_error(i, "an integer")),
        }
    }

    /// Values stored as given, where zero is legal and negatives are not.
    fn non_negative(&self, i: usize) -> Result<u64, ContractError> {
        match &self.args[i] {
            Argument::Integer(value) => u64::try_from(*value).map_err(|_| {
                ContractError::Validation(format!(
                    "{} argument {} must not be negative, got {value}",
                    self.method,
                    i + 1
                ))
            }),
            Argument::Bytes(_) => Err(self.kind_error(i, "an integer")),
        }
    }

    fn kind_error(&self, i: usize, expected: &str) -> ContractError {
        ContractError::Validation(format!(
            "{} argument {} must be {expected}",
            self.method,
            i + 1
        ))
    }
}

/// Value returned by a successful call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReturnValue {
    Bool(bool),
    Integer(u64),
    Text(String),
}

/// Outcome of a committed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub value: ReturnValue,
    pub notifications: Vec<Notification>,
}

/// The ledger engine bound to a storage backend.
pub struct Contract<S: Store> {
    store: S,
    params: ContractParams,
}

impl<S: Store> Contract<S> {
    pub fn new(store: S, params: ContractParams) -> Self {
        Self { store, params }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn params(&self) -> &ContractParams {
        &self.params
    }

    /// Read-only view of the committed state.
    pub fn state(&self) -> ContractState<'_> {
        ContractState::new(&self.store)
    }

    /// Run one call and commit its effects atomically.
    ///
    /// On error the store is left exactly as it was.
    pub fn invoke(
        &mut self,
        env: &Environment<'_>,
        method: &str,
        args: &[Argument],
    ) -> Result<Receipt, ContractError> {
        let mut state = ContractState::new(&self.store);

        let value = if method == "deploy" {
            if !args.is_empty() {
                return Err(ContractError::Validation(
                    "deploy takes no arguments".to_string(),
                ));
            }
            deploy(&mut state, &self.params, env.signer)?
        } else {
            emission::advance(&mut state, &self.params, env.height)?;
            let call = Call::parse(method, args)?;
            execute(&mut state, &self.params, env.signer, call)?
        };

        let (changes, notifications) = state.into_parts();
        self.store.commit(changes)?;

        Ok(Receipt {
            value,
            notifications,
        })
    }
}

fn deploy(
    state: &mut ContractState<'_>,
    params: &ContractParams,
    signer: &dyn Signer,
) -> Result<ReturnValue, ContractError> {
    require_witness(signer, &params.admin)?;

    if state.supply()? != 0 {
        debug!("Already deployed");
        return Err(ContractError::AlreadyDeployed);
    }
    if params.initial_supply == 0 || params.initial_supply > params.maximum_supply {
        return Err(ContractError::Validation(format!(
            "initial supply {} must be positive and at most {}",
            params.initial_supply, params.maximum_supply
        )));
    }

    state.set_supply(params.initial_supply);
    state.set_pool(params.initial_supply);
    state.set_current_block(0);
    state.set_last_seen_height(None);

    info!(supply = params.initial_supply, admin = %params.admin, "Contract deployed");
    Ok(ReturnValue::Bool(true))
}

fn execute(
    state: &mut ContractState<'_>,
    params: &ContractParams,
    signer: &dyn Signer,
    call: Call,
) -> Result<ReturnValue, ContractError> {
    let value = match call {
        Call::Name => ReturnValue::Text(TOKEN_NAME.to_string()),
        Call::Symbol => ReturnValue::Text(TOKEN_SYMBOL.to_string()),
        Call::Decimals => ReturnValue::Integer(TOKEN_DECIMALS),
        Call::TotalSupply => ReturnValue::Integer(state.supply()?),
        Call::BalanceOf { address } => ReturnValue::Integer(balance::balance_of(state, &address)?),
        Call::Transfer { from, to, amount } => {
            balance::transfer(state, signer, &from, &to, amount)?;
            ReturnValue::Bool(true)
        }
        Call::TransferFromPool { to, amount } => {
            balance::transfer_from_pool(state, params, signer, &to, amount)?;
            ReturnValue::Bool(true)
        }
        Call::PostGeo {
            reporter,
            location,
            timestamp,
        } => {
            journal::post(state, signer, &reporter, location, timestamp)?;
            ReturnValue::Bool(true)
        }
        Call::RequestGeo {
            requester,
            n_blocks,
        } => {
            let records = journal::query(state, signer, &requester, n_blocks)?
                .collect::<Result<Vec<_>, _>>()?;
            debug!(%requester, count = records.len(), "Geolocations requested");
            for record in records {
                state.notify(Notification::GeoRecord(record));
            }
            ReturnValue::Bool(true)
        }
        Call::RequestTicket { address, n_blocks } => {
            ticket::request_ticket(state, params, signer, &address, n_blocks)?;
            ReturnValue::Bool(true)
        }
    };
    Ok(value)
}
