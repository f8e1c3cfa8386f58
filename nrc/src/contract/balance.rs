// Copyright (c) 2024 Botho Foundation

//! Account balances.

use tracing::debug;

use super::{require_witness, ContractError, ContractParams, ContractState, Notification, Signer};
use crate::address::Address;

fn require_positive(amount: u64) -> Result<(), ContractError> {
    if amount == 0 {
        debug!("Invalid amount");
        return Err(ContractError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Move `amount` from `from` to `to`. `from == to` only emits the event.
pub fn transfer(
    state: &mut ContractState<'_>,
    signer: &dyn Signer,
    from: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), ContractError> {
    require_positive(amount)?;
    require_witness(signer, from)?;

    let from_balance = state.balance(from)?;
    if from_balance < amount {
        debug!(%from, from_balance, amount, "Insufficient balance");
        return Err(ContractError::InsufficientBalance {
            available: from_balance,
            required: amount,
        });
    }

    if from != to {
        state.set_balance(from, from_balance - amount);
        state.add_balance(to, amount)?;
    }

    state.notify(Notification::Transfer {
        from: Some(*from),
        to: Some(*to),
        amount,
    });
    Ok(())
}

/// Disburse minted supply from the pool. Only the admin may do this.
pub fn transfer_from_pool(
    state: &mut ContractState<'_>,
    params: &ContractParams,
    signer: &dyn Signer,
    to: &Address,
    amount: u64,
) -> Result<(), ContractError> {
    require_positive(amount)?;
    require_witness(signer, &params.admin)?;

    let pool = state.pool()?;
    if pool < amount {
        debug!(pool, amount, "Insufficient balance in pool");
        return Err(ContractError::InsufficientSupply {
            available: pool,
            required: amount,
        });
    }

    state.set_pool(pool - amount);
    state.add_balance(to, amount)?;
    state.notify(Notification::Transfer {
        from: None,
        to: Some(*to),
        amount,
    });
    Ok(())
}

pub fn balance_of(state: &ContractState<'_>, address: &Address) -> Result<u64, ContractError> {
    state.balance(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::WitnessSet;
    use crate::store::MemoryStore;

    const ADMIN: Address = Address::new([0xad; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);
    const BOB: Address = Address::new([0xb0; 20]);

    #[test]
    fn test_transfer_moves_funds() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        state.set_balance(&ALICE, 1024);

        transfer(&mut state, &WitnessSet::new([ALICE]), &ALICE, &BOB, 150).unwrap();

        assert_eq!(balance_of(&state, &ALICE).unwrap(), 874);
        assert_eq!(balance_of(&state, &BOB).unwrap(), 150);
        assert_eq!(
            state.notifications(),
            &[Notification::Transfer {
                from: Some(ALICE),
                to: Some(BOB),
                amount: 150
            }]
        );
    }

    #[test]
    fn test_self_transfer_only_notifies() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        state.set_balance(&ALICE, 10);

        transfer(&mut state, &WitnessSet::new([ALICE]), &ALICE, &ALICE, 10).unwrap();

        assert_eq!(balance_of(&state, &ALICE).unwrap(), 10);
        assert_eq!(state.notifications().len(), 1);
    }

    #[test]
    fn test_transfer_rejections() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        let alice = WitnessSet::new([ALICE]);

        assert!(matches!(
            transfer(&mut state, &alice, &ALICE, &BOB, 0),
            Err(ContractError::Validation(_))
        ));
        assert!(matches!(
            transfer(&mut state, &WitnessSet::new([BOB]), &ALICE, &BOB, 1),
            Err(ContractError::AuthorizationDenied(a)) if a == ALICE
        ));
        assert!(matches!(
            transfer(&mut state, &alice, &ALICE, &BOB, 1),
            Err(ContractError::InsufficientBalance { available: 0, required: 1 })
        ));
        assert!(state.is_clean());
    }

    #[test]
    fn test_pool_disbursement_requires_admin() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        state.set_pool(50_000_000);
        let params = ContractParams::new(ADMIN);

        assert!(matches!(
            transfer_from_pool(&mut state, &params, &WitnessSet::new([ALICE]), &ALICE, 5),
            Err(ContractError::AuthorizationDenied(a)) if a == ADMIN
        ));

        transfer_from_pool(&mut state, &params, &WitnessSet::new([ADMIN]), &ALICE, 1024).unwrap();
        assert_eq!(state.pool().unwrap(), 49_998_976);
        assert_eq!(balance_of(&state, &ALICE).unwrap(), 1024);
        assert_eq!(
            state.notifications(),
            &[Notification::Transfer {
                from: None,
                to: Some(ALICE),
                amount: 1024
            }]
        );
    }

    #[test]
    fn test_pool_cannot_overdraw() {
        let store = MemoryStore::new();
        let mut state = ContractState::new(&store);
        state.set_pool(3);
        let params = ContractParams::new(ADMIN);

        assert!(matches!(
            transfer_from_pool(&mut state, &params, &WitnessSet::new([ADMIN]), &ALICE, 4),
            Err(ContractError::InsufficientSupply { available: 3, required: 4 })
        ));
        assert!(matches!(
            transfer_from_pool(&mut state, &params, &WitnessSet::new([ADMIN]), &ALICE, 0),
            Err(ContractError::Validation(_))
        ));
    }
}
