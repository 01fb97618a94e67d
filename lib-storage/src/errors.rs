//! Storage backend errors

use thiserror::Error;

/// Error during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database failed to open
    #[error("Database open failed: {0}")]
    OpenFailed(String),

    /// Read operation failed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Write operation failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Delete operation failed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// Flush operation failed
    #[error("Flush failed: {0}")]
    FlushFailed(String),

    /// Empty key not allowed
    #[error("Empty keys are not allowed")]
    EmptyKey,

    /// Key exceeds maximum allowed size
    #[error("Key exceeds maximum size of {max} bytes (got {actual})")]
    KeyTooLarge { max: usize, actual: usize },

    /// Value exceeds maximum allowed size
    #[error("Value exceeds maximum size of {max} bytes (got {actual})")]
    ValueTooLarge { max: usize, actual: usize },

    /// A thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
