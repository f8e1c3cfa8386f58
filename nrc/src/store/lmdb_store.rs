// Copyright (c) 2024 Botho Foundation

use lmdb::{Cursor, Database, Environment, EnvironmentFlags, Transaction, WriteFlags};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{ChangeSet, StorageKey, Store, StoreError};

impl From<lmdb::Error> for StoreError {
    fn from(e: lmdb::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// LMDB-backed contract state
pub struct LmdbStore {
    env: Environment,
    /// state: encoded StorageKey -> value
    state_db: Database,
}

impl LmdbStore {
    /// Open or create the state database in the given directory
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(path)?;

        let env = Environment::new()
            .set_flags(EnvironmentFlags::NO_SUB_DIR)
            .set_max_dbs(1)
            .set_map_size(1024 * 1024 * 1024) // 1GB
            .open(path.join("state.mdb").as_ref())?;

        let state_db = env.create_db(Some("state"), lmdb::DatabaseFlags::empty())?;

        debug!("Opened state database at {}", path.display());
        Ok(Self { env, state_db })
    }
}

impl Store for LmdbStore {
    fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        match txn.get(self.state_db, &key.encode()) {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut txn = self.env.begin_rw_txn()?;
        for (key, value) in &changes {
            let encoded = key.encode();
            match value {
                Some(value) => txn.put(self.state_db, &encoded, value, WriteFlags::empty())?,
                None => match txn.del(self.state_db, &encoded, None) {
                    Ok(()) | Err(lmdb::Error::NotFound) => {}
                    Err(e) => return Err(e.into()),
                },
            }
        }
        txn.commit()?;

        debug!("Committed {} state changes", changes.len());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(StorageKey, Vec<u8>)>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        let mut cursor = txn.open_ro_cursor(self.state_db)?;

        let mut entries = Vec::new();
        for item in cursor.iter_start() {
            let (key, value) = item?;
            entries.push((StorageKey::decode(key)?, value.to_vec()));
        }
        Ok(entries)
    }
}
