//! In-memory store for tests
//!
//! Uses interior mutability via `Arc<Mutex<>>` so `&self` methods stay
//! thread-safe, matching the trait contract of the durable backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::errors::{StorageError, StorageResult};
use crate::traits::{validate_key, validate_value, LedgerStore};

/// Ephemeral key-value store backed by a `HashMap`.
///
/// Cloning shares the underlying map, so a test can hand one handle to an
/// executor and keep another to inspect or rebuild against the same state.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> StorageResult<usize> {
        let data = self.data.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(data.len())
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let data = self.data.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        validate_value(value)?;
        let mut data = self.data.lock().map_err(|_| StorageError::LockPoisoned)?;
        data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        let mut data = self.data.lock().map_err(|_| StorageError::LockPoisoned)?;
        data.remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> StorageResult<bool> {
        validate_key(key)?;
        let data = self.data.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(data.contains_key(key))
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}
