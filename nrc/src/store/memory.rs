// Copyright (c) 2024 Botho Foundation

use std::collections::BTreeMap;

use super::{ChangeSet, StorageKey, Store, StoreError};

/// In-memory store keyed by encoded key bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(&key.encode()).cloned())
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<(), StoreError> {
        for (key, value) in changes {
            match value {
                Some(value) => {
                    self.entries.insert(key.encode(), value);
                }
                None => {
                    self.entries.remove(&key.encode());
                }
            }
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(StorageKey, Vec<u8>)>, StoreError> {
        self.entries
            .iter()
            .map(|(key, value)| StorageKey::decode(key).map(|key| (key, value.clone())))
            .collect()
    }
}
