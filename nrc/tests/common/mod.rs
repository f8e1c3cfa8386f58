// Copyright (c) 2024 Botho Foundation
//
//! Common test utilities for ledger integration tests.
//!
//! `TestLedger` drives a [`Contract`] through its public dispatch surface
//! with explicit chain heights and signers, and checks the accounting law
//! after every committed call.

#![allow(dead_code)]

use nrc::address::Address;
use nrc::contract::{
    Argument, Contract, ContractError, ContractParams, Environment, Receipt, WitnessSet,
};
use nrc::store::{decode_u64, MemoryStore, StorageKey, Store};

pub const ADMIN: Address = Address::new([0xad; 20]);
pub const TEST: Address = Address::new([0x7e; 20]);
pub const ALICE: Address = Address::new([0xa1; 20]);
pub const BOB: Address = Address::new([0xb0; 20]);
pub const CAROL: Address = Address::new([0xc4; 20]);

pub fn addr(address: &Address) -> Argument {
    address.into()
}

pub fn int(value: i64) -> Argument {
    Argument::Integer(value)
}

pub fn text(value: &str) -> Argument {
    Argument::Bytes(value.as_bytes().to_vec())
}

/// Parameters that mint nothing per block, so pool arithmetic is exact.
pub fn no_emission_params() -> ContractParams {
    ContractParams {
        generation_per_block: 0,
        ..ContractParams::new(ADMIN)
    }
}

pub struct TestLedger<S: Store> {
    pub contract: Contract<S>,
}

impl TestLedger<MemoryStore> {
    pub fn in_memory(params: ContractParams) -> Self {
        Self::new(MemoryStore::new(), params)
    }

    /// Committed store contents, for before/after comparisons
    pub fn snapshot(&self) -> MemoryStore {
        self.contract.store().clone()
    }
}

impl<S: Store> TestLedger<S> {
    pub fn new(store: S, params: ContractParams) -> Self {
        Self {
            contract: Contract::new(store, params),
        }
    }

    /// Invoke a method and check conservation if it committed
    pub fn call(
        &mut self,
        height: u64,
        signers: &[Address],
        method: &str,
        args: &[Argument],
    ) -> Result<Receipt, ContractError> {
        let witnesses = WitnessSet::new(signers.iter().copied());
        let env = Environment::new(height, &witnesses);
        let result = self.contract.invoke(&env, method, args);
        if result.is_ok() {
            self.assert_conserved();
        }
        result
    }

    pub fn deploy(&mut self, height: u64) {
        self.call(height, &[ADMIN], "deploy", &[])
            .expect("deploy failed");
    }

    pub fn supply(&self) -> u64 {
        self.contract.state().supply().unwrap()
    }

    pub fn pool(&self) -> u64 {
        self.contract.state().pool().unwrap()
    }

    pub fn block(&self) -> u64 {
        self.contract.state().current_block().unwrap()
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.contract.state().balance(address).unwrap()
    }

    pub fn credit(&self, block: u64) -> u64 {
        self.contract.state().credit(block).unwrap()
    }

    pub fn ticket(&self, address: &Address) -> Option<u64> {
        self.contract.state().ticket(address).unwrap()
    }

    /// `sum(balances) + pool + sum(credit) == supply <= maximum_supply`
    pub fn assert_conserved(&self) {
        let mut accounted: u128 = 0;
        for (key, value) in self.contract.store().entries().unwrap() {
            if matches!(
                key,
                StorageKey::Balance(_) | StorageKey::PoolBalance | StorageKey::Credit(_)
            ) {
                accounted += decode_u64(&key, &value).unwrap() as u128;
            }
        }
        let supply = self.supply();
        assert_eq!(accounted, supply as u128, "accounting does not sum to supply");
        assert!(supply <= self.contract.params().maximum_supply);
    }
}
