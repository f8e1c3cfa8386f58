// Copyright (c) 2024 Botho Foundation

//! Prepaid journal access.
//!
//! Buying a ticket for `n` blocks costs `fee_per_block * n`. The fee is split
//! into the credit escrow of the next `n` logical blocks, starting with the
//! current one, where settlement later pays it out to those blocks'
//! reporters. The ticket is valid through block `current + n - 1`; a new
//! purchase replaces the previous expiry rather than extending it.

use tracing::{debug, info};

use super::{require_witness, ContractError, ContractParams, ContractState, Notification, Signer};
use crate::address::Address;
use crate::store::StorageKey;

/// Buy a ticket for `n_blocks` logical blocks. Returns the last valid block.
pub fn request_ticket(
    state: &mut ContractState<'_>,
    params: &ContractParams,
    signer: &dyn Signer,
    address: &Address,
    n_blocks: u64,
) -> Result<u64, ContractError> {
    if n_blocks == 0 {
        debug!("Invalid nBlocks");
        return Err(ContractError::Validation(
            "ticket length must be at least one block".to_string(),
        ));
    }

    require_witness(signer, address)?;

    let balance = state.balance(address)?;
    // A fee too large to represent is unaffordable by definition
    let fee = params.fee_per_block.saturating_mul(n_blocks);
    if balance < fee {
        debug!(%address, balance, fee, "Insufficient balance to request ticket");
        return Err(ContractError::InsufficientBalance {
            available: balance,
            required: fee,
        });
    }

    let first = state.current_block()?;
    let last = first
        .checked_add(n_blocks - 1)
        .ok_or(ContractError::Overflow(StorageKey::Ticket(*address)))?;

    state.set_balance(address, balance - fee);
    state.notify(Notification::Transfer {
        from: Some(*address),
        to: None,
        amount: fee,
    });

    if params.fee_per_block > 0 {
        for block in first..=last {
            state.add_credit(block, params.fee_per_block)?;
        }
    }

    state.set_ticket(address, last);
    info!(%address, first, last, fee, "User registered");

    Ok(last)
}

/// Whether `address` holds a ticket valid for `block`.
pub fn ticket_valid_at(
    state: &ContractState<'_>,
    address: &Address,
    block: u64,
) -> Result<bool, ContractError> {
    Ok(state
        .ticket(address)?
        .is_some_and(|valid_through| valid_through >= block))
}
