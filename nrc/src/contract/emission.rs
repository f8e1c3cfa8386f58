// Copyright (c) 2024 Botho Foundation

//! Block-paced emission.
//!
//! The logical block counter is paced by the host chain: it advances by
//! exactly one the first time a call observes a new chain height, however far
//! that height jumped. Each advance first settles the block that just closed
//! and then mints `generation_per_block` into the pool, clamped so that the
//! supply never exceeds `maximum_supply`.

use tracing::{debug, info};

use super::settlement::{self, Settlement};
use super::{ContractError, ContractParams, ContractState};
use crate::store::StorageKey;

/// Which way the emission state machine moves for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Supply is zero: the contract was never deployed
    Reject,
    /// The chain height has not changed since the last advance
    Hold,
    /// A new chain height: close the current block and open the next
    Advance,
}

/// Result of the emission step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    SameHeight,
    Advanced {
        /// Block that was closed and settled
        closed: u64,
        /// Block that is now current
        current: u64,
        settlement: Settlement,
        /// Supply added to the pool
        minted: u64,
    },
}

impl Advance {
    pub fn advanced(&self) -> bool {
        matches!(self, Advance::Advanced { .. })
    }
}

pub fn next_transition(supply: u64, last_seen_height: Option<u64>, height: u64) -> Transition {
    if supply == 0 {
        Transition::Reject
    } else if last_seen_height == Some(height) {
        Transition::Hold
    } else {
        Transition::Advance
    }
}

/// Supply minted by one advance at the given supply.
pub fn mint_amount(supply: u64, params: &ContractParams) -> u64 {
    params
        .maximum_supply
        .saturating_sub(supply)
        .min(params.generation_per_block)
}

/// Run the emission step for a call observed at chain `height`.
pub fn advance(
    state: &mut ContractState<'_>,
    params: &ContractParams,
    height: u64,
) -> Result<Advance, ContractError> {
    let supply = state.supply()?;
    let last_seen_height = state.last_seen_height()?;

    match next_transition(supply, last_seen_height, height) {
        Transition::Reject => {
            debug!("Not yet deployed");
            Err(ContractError::NotDeployed)
        }
        Transition::Hold => {
            debug!(height, "Call is within the same block");
            Ok(Advance::SameHeight)
        }
        Transition::Advance => {
            let closed = state.current_block()?;
            let current = closed
                .checked_add(1)
                .ok_or(ContractError::Overflow(StorageKey::BlockCounter))?;
            state.set_current_block(current);
            state.set_last_seen_height(Some(height));

            let settlement = settlement::settle(state, closed)?;

            let minted = mint_amount(supply, params);
            if minted > 0 {
                let pool = state
                    .pool()?
                    .checked_add(minted)
                    .ok_or(ContractError::Overflow(StorageKey::PoolBalance))?;
                state.set_supply(supply + minted);
                state.set_pool(pool);
            }

            info!(block = current, height, minted, "Advanced logical block");

            Ok(Advance::Advanced {
                closed,
                current,
                settlement,
                minted,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::store::MemoryStore;

    fn params() -> ContractParams {
        ContractParams::new(Address::new([0xad; 20]))
    }

    fn deployed(state: &mut ContractState<'_>, supply: u64) {
        state.set_supply(supply);
        state.set_pool(supply);
        state.set_current_block(0);
    }

    #[test]
    fn test_transitions() {
        assert_eq!(next_transition(0, None, 5), Transition::Reject);
        assert_eq!(next_transition(0, Some(5), 5), Transition::Reject);
        assert_eq!(next_transition(10, None, 0), Transition::Advance);
        assert_eq!(next_transition(10, Some(5), 5), Transition::Hold);
        assert_eq!(next_transition(10, Some(5), 6), Transition::Advance);
        assert_eq!(next_transition(10, Some(5), 500), Transition::Advance);
    }

    #[test]
    fn test_mint_amount_clamps_at_cap() {
        let params = params();
        assert_eq!(mint_amount(50_000_000, &params), 100);
        assert_eq!(mint_amount(99_999_950, &params), 50);
        assert_eq!(mint_amount(100_000_000, &params), 0);
    }

    #[test]
    fn test_not_deployed_rejects_without_writes() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);

        assert!(matches!(
            advance(&mut state, &params(), 1),
            Err(ContractError::NotDeployed)
        ));
        assert!(state.is_clean());
    }

    #[test]
    fn test_first_call_after_deploy_advances_and_mints() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        deployed(&mut state, 50_000_000);

        let step = advance(&mut state, &params(), 1234).unwrap();
        assert_eq!(
            step,
            Advance::Advanced {
                closed: 0,
                current: 1,
                settlement: Settlement::Idle,
                minted: 100,
            }
        );
        assert_eq!(state.current_block().unwrap(), 1);
        assert_eq!(state.last_seen_height().unwrap(), Some(1234));
        assert_eq!(state.supply().unwrap(), 50_000_100);
        assert_eq!(state.pool().unwrap(), 50_000_100);
    }

    #[test]
    fn test_same_height_is_a_no_op() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        deployed(&mut state, 50_000_000);
        advance(&mut state, &params(), 7).unwrap();

        let step = advance(&mut state, &params(), 7).unwrap();
        assert_eq!(step, Advance::SameHeight);
        assert!(!step.advanced());
        assert_eq!(state.current_block().unwrap(), 1);
        assert_eq!(state.supply().unwrap(), 50_000_100);
    }

    #[test]
    fn test_height_jump_advances_exactly_one_block() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        deployed(&mut state, 50_000_000);
        state.set_credit(1, 30);

        advance(&mut state, &params(), 10).unwrap();
        let step = advance(&mut state, &params(), 1_000).unwrap();

        assert_eq!(
            step,
            Advance::Advanced {
                closed: 1,
                current: 2,
                settlement: Settlement::RolledForward { amount: 30 },
                minted: 100,
            }
        );
        assert_eq!(state.current_block().unwrap(), 2);
        assert_eq!(state.credit(2).unwrap(), 30);
        assert_eq!(state.supply().unwrap(), 50_000_200);
    }

    #[test]
    fn test_mint_stops_at_cap() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        deployed(&mut state, 99_999_950);

        advance(&mut state, &params(), 1).unwrap();
        assert_eq!(state.supply().unwrap(), 100_000_000);
        assert_eq!(state.pool().unwrap(), 100_000_000);

        let step = advance(&mut state, &params(), 2).unwrap();
        assert!(matches!(step, Advance::Advanced { current: 2, minted: 0, .. }));
        assert_eq!(state.supply().unwrap(), 100_000_000);
    }

    #[test]
    fn test_settles_the_closed_block_not_the_new_one() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        deployed(&mut state, 50_000_000);
        advance(&mut state, &params(), 1).unwrap();

        // Credit for the current block (1) and the next one (2)
        state.set_credit(1, 10);
        state.set_credit(2, 10);

        advance(&mut state, &params(), 2).unwrap();
        // Block 1 had no reporters, so its credit joined block 2's
        assert_eq!(state.credit(1).unwrap(), 0);
        assert_eq!(state.credit(2).unwrap(), 20);
    }
}
