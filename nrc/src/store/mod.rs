// Copyright (c) 2024 Botho Foundation

//! Key-value storage for contract state.
//!
//! The engine never writes to a backend directly. Each call reads through a
//! [`StagedState`] overlay and, only once every precondition has passed,
//! hands the collected [`ChangeSet`] to [`Store::commit`], which applies it
//! atomically.

mod keys;
mod lmdb_store;
mod memory;
mod staged;

pub use self::keys::StorageKey;
pub use self::lmdb_store::LmdbStore;
pub use self::memory::MemoryStore;
pub use self::staged::StagedState;

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt value at {key}: {reason}")]
    Corrupt { key: StorageKey, reason: String },

    #[error("Unknown storage key: {0}")]
    UnknownKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Staged writes for one call: `Some(value)` puts, `None` deletes.
pub type ChangeSet = BTreeMap<StorageKey, Option<Vec<u8>>>;

/// A durable mapping from storage key to value.
pub trait Store {
    /// Read the committed value of a key.
    fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Apply every change in the set, or none of them.
    fn commit(&mut self, changes: ChangeSet) -> Result<(), StoreError>;

    /// All committed entries, sorted by encoded key.
    fn entries(&self) -> Result<Vec<(StorageKey, Vec<u8>)>, StoreError>;
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn decode_u64(key: &StorageKey, bytes: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = bytes.try_into().map_err(|_| StoreError::Corrupt {
        key: *key,
        reason: format!("expected 8 bytes, got {}", bytes.len()),
    })?;
    Ok(u64::from_le_bytes(bytes))
}
