//! Sled-based durable store
//!
//! Production backend for ledger state on sled, an embedded database with
//! crash-safe writes.
//!
//! # Durability
//!
//! Every `set` flushes before returning: a ledger snapshot reported as
//! persisted must survive an immediate process kill. The write rate of a
//! single-aggregate ledger is low enough that per-write flushing is the
//! right trade.
//!
//! A database that fails to open is surfaced as an error, never cleared:
//! unlike re-synchronizable network caches, ledger state has no second copy
//! to recover from.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{StorageError, StorageResult};
use crate::traits::{validate_key, validate_value, LedgerStore};

/// Durable key-value store backed by a sled database.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open or create a sled database at the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory for the database files
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::Config::default()
            .path(path.as_ref())
            .open()
            .map_err(|e| StorageError::OpenFailed(e.to_string()))?;

        info!(path = %path.as_ref().display(), "ledger store opened");
        Ok(Self { db })
    }
}

impl LedgerStore for SledStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let value = self
            .db
            .get(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        validate_value(value)?;
        self.db
            .insert(key, value)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        // The snapshot is only "persisted" once it is on disk
        self.db
            .flush()
            .map_err(|e| StorageError::FlushFailed(e.to_string()))?;
        debug!(key_len = key.len(), value_len = value.len(), "snapshot written");
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        self.db
            .remove(key)
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| StorageError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> StorageResult<bool> {
        validate_key(key)?;
        self.db
            .contains_key(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))
    }

    fn flush(&self) -> StorageResult<()> {
        self.db
            .flush()
            .map_err(|e| StorageError::FlushFailed(e.to_string()))?;
        Ok(())
    }
}
