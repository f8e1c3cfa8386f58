// Copyright (c) 2024 Botho Foundation

use super::{ContractError, GeoRecord, Notification};
use crate::address::Address;
use crate::store::{ChangeSet, StagedState, StorageKey, Store};

/// Typed view of the contract's storage for the duration of one call.
///
/// Writes and notifications are buffered; see [`ContractState::into_parts`].
pub struct ContractState<'s> {
    staged: StagedState<'s>,
    notifications: Vec<Notification>,
}

impl<'s> ContractState<'s> {
    pub fn new(store: &'s dyn Store) -> Self {
        Self {
            staged: StagedState::new(store),
            notifications: Vec::new(),
        }
    }

    pub fn supply(&self) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::Supply)?)
    }

    pub fn set_supply(&mut self, supply: u64) {
        self.staged.put_u64(StorageKey::Supply, supply);
    }

    /// Current logical block
    pub fn current_block(&self) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::BlockCounter)?)
    }

    pub fn set_current_block(&mut self, block: u64) {
        self.staged.put_u64(StorageKey::BlockCounter, block);
    }

    /// Chain height of the last block advance, `None` until the first one
    pub fn last_seen_height(&self) -> Result<Option<u64>, ContractError> {
        Ok(self.staged.get_u64_opt(&StorageKey::LastSeenHeight)?)
    }

    pub fn set_last_seen_height(&mut self, height: Option<u64>) {
        match height {
            Some(height) => self.staged.put_u64(StorageKey::LastSeenHeight, height),
            None => self.staged.delete(StorageKey::LastSeenHeight),
        }
    }

    pub fn pool(&self) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::PoolBalance)?)
    }

    pub fn set_pool(&mut self, amount: u64) {
        self.staged.put_u64(StorageKey::PoolBalance, amount);
    }

    pub fn balance(&self, address: &Address) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::Balance(*address))?)
    }

    pub fn set_balance(&mut self, address: &Address, amount: u64) {
        self.staged.put_u64(StorageKey::Balance(*address), amount);
    }

    /// Add to an account balance, returning the new balance.
    pub fn add_balance(&mut self, address: &Address, amount: u64) -> Result<u64, ContractError> {
        let key = StorageKey::Balance(*address);
        let balance = self
            .balance(address)?
            .checked_add(amount)
            .ok_or(ContractError::Overflow(key))?;
        self.set_balance(address, balance);
        Ok(balance)
    }

    pub fn credit(&self, block: u64) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::Credit(block))?)
    }

    /// Set a block's credit; zero clears the key.
    pub fn set_credit(&mut self, block: u64, amount: u64) {
        if amount == 0 {
            self.staged.delete(StorageKey::Credit(block));
        } else {
            self.staged.put_u64(StorageKey::Credit(block), amount);
        }
    }

    pub fn add_credit(&mut self, block: u64, amount: u64) -> Result<u64, ContractError> {
        let credit = self
            .credit(block)?
            .checked_add(amount)
            .ok_or(ContractError::Overflow(StorageKey::Credit(block)))?;
        self.set_credit(block, credit);
        Ok(credit)
    }

    /// Number of entries (reporters) appended to a block
    pub fn reporter_count(&self, block: u64) -> Result<u64, ContractError> {
        Ok(self.staged.get_u64(&StorageKey::ReporterCount(block))?)
    }

    pub fn set_reporter_count(&mut self, block: u64, count: u64) {
        self.staged.put_u64(StorageKey::ReporterCount(block), count);
    }

    /// Reporter of entry `index` (1-based) in `block`
    pub fn reporter(&self, block: u64, index: u64) -> Result<Address, ContractError> {
        let key = StorageKey::EntryReporter(block, index);
        self.staged
            .get_address(&key)?
            .ok_or_else(|| missing_entry(key))
    }

    pub fn entry(&self, block: u64, index: u64) -> Result<GeoRecord, ContractError> {
        let ts_key = StorageKey::EntryTimestamp(block, index);
        let timestamp = self
            .staged
            .get_u64_opt(&ts_key)?
            .ok_or_else(|| missing_entry(ts_key))?;
        let reporter = self.reporter(block, index)?;
        let geo_key = StorageKey::EntryLocation(block, index);
        let location = self
            .staged
            .get(&geo_key)?
            .ok_or_else(|| missing_entry(geo_key))?;

        Ok(GeoRecord {
            block,
            index,
            timestamp,
            reporter,
            location,
        })
    }

    pub fn put_entry(&mut self, record: &GeoRecord) {
        let (block, index) = (record.block, record.index);
        self.staged
            .put_u64(StorageKey::EntryTimestamp(block, index), record.timestamp);
        self.staged.put(
            StorageKey::EntryReporter(block, index),
            record.reporter.as_bytes().to_vec(),
        );
        self.staged
            .put(StorageKey::EntryLocation(block, index), record.location.clone());
    }

    /// Last block through which an account's ticket is valid
    pub fn ticket(&self, address: &Address) -> Result<Option<u64>, ContractError> {
        Ok(self.staged.get_u64_opt(&StorageKey::Ticket(*address))?)
    }

    pub fn set_ticket(&mut self, address: &Address, valid_through: u64) {
        self.staged
            .put_u64(StorageKey::Ticket(*address), valid_through);
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_clean() && self.notifications.is_empty()
    }

    /// Staged writes and notifications, for commit by the dispatcher.
    pub fn into_parts(self) -> (ChangeSet, Vec<Notification>) {
        (self.staged.into_changes(), self.notifications)
    }
}

fn missing_entry(key: StorageKey) -> ContractError {
    ContractError::Store(crate::store::StoreError::Corrupt {
        key,
        reason: "journal entry is missing".to_string(),
    })
}
