// Copyright (c) 2024 Botho Foundation

use super::{decode_u64, encode_u64, ChangeSet, StorageKey, Store, StoreError};
use crate::address::Address;

/// Read-through write buffer over a committed store.
///
/// Reads see the staged value first and fall back to the store. Nothing
/// reaches the store until the owner commits the result of
/// [`StagedState::into_changes`]; dropping the state discards every write.
pub struct StagedState<'s> {
    store: &'s dyn Store,
    writes: ChangeSet,
}

impl<'s> StagedState<'s> {
    pub fn new(store: &'s dyn Store) -> Self {
        Self {
            store,
            writes: ChangeSet::new(),
        }
    }

    pub fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.store.get(key),
        }
    }

    pub fn put(&mut self, key: StorageKey, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: StorageKey) {
        self.writes.insert(key, None);
    }

    /// Integer value of a key; absent keys read as zero.
    pub fn get_u64(&self, key: &StorageKey) -> Result<u64, StoreError> {
        Ok(self.get_u64_opt(key)?.unwrap_or(0))
    }

    pub fn get_u64_opt(&self, key: &StorageKey) -> Result<Option<u64>, StoreError> {
        self.get(key)?
            .map(|bytes| decode_u64(key, &bytes))
            .transpose()
    }

    pub fn put_u64(&mut self, key: StorageKey, value: u64) {
        self.put(key, encode_u64(value));
    }

    pub fn get_address(&self, key: &StorageKey) -> Result<Option<Address>, StoreError> {
        self.get(key)?
            .map(|bytes| {
                Address::try_from(bytes.as_slice()).map_err(|e| StoreError::Corrupt {
                    key: *key,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Whether any write has been staged.
    pub fn is_clean(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_changes(self) -> ChangeSet {
        self.writes
    }
}
