// Copyright (c) 2024 Botho Foundation

//! Block-boundary credit settlement.
//!
//! When a logical block closes, the credit escrowed for it is split evenly
//! among the block's reporters in append order. Whatever cannot be split
//! (the division remainder, or the whole amount when nobody reported) moves
//! to the next block's credit. Settlement never mints: every unit of credit
//! ends up either in a reporter balance or in the next block's escrow.

use tracing::{debug, info};

use super::{ContractError, ContractState, Notification};

/// Even split of a block's credit among its reporters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditSplit {
    /// Amount paid to each reporter
    pub share: u64,
    /// Amount carried to the next block
    pub remainder: u64,
}

impl CreditSplit {
    /// `None` when there are no reporters to pay.
    pub fn new(credit: u64, reporters: u64) -> Option<Self> {
        if reporters == 0 {
            return None;
        }
        let share = credit / reporters;
        Some(Self {
            share,
            remainder: credit % reporters,
        })
    }
}

/// What settling one closed block did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The block had no credit
    Idle,
    /// Nobody reported; the whole credit moved to the next block
    RolledForward { amount: u64 },
    /// Each reporter received `share`; `remainder` moved to the next block.
    /// A zero share means the credit was smaller than the reporter count.
    Paid {
        share: u64,
        reporters: u64,
        remainder: u64,
    },
}

/// Settle the credit of `closed` into its reporters and `closed + 1`.
///
/// Only the emission step calls this, once per logical block advance.
pub(crate) fn settle(state: &mut ContractState<'_>, closed: u64) -> Result<Settlement, ContractError> {
    let credit = state.credit(closed)?;
    if credit == 0 {
        return Ok(Settlement::Idle);
    }

    let next = closed + 1;
    state.set_credit(closed, 0);

    let reporters = state.reporter_count(closed)?;
    let Some(split) = CreditSplit::new(credit, reporters) else {
        state.add_credit(next, credit)?;
        debug!(block = closed, amount = credit, "No reporters, credit rolled forward");
        return Ok(Settlement::RolledForward { amount: credit });
    };

    if split.remainder > 0 {
        state.add_credit(next, split.remainder)?;
    }

    if split.share > 0 {
        for index in 1..=reporters {
            let reporter = state.reporter(closed, index)?;
            state.add_balance(&reporter, split.share)?;
            state.notify(Notification::Transfer {
                from: None,
                to: Some(reporter),
                amount: split.share,
            });
        }
    }

    info!(
        block = closed,
        credit,
        reporters,
        share = split.share,
        remainder = split.remainder,
        "Settled block credit"
    );

    Ok(Settlement::Paid {
        share: split.share,
        reporters,
        remainder: split.remainder,
    })
}
