//! Token Ledger Errors

use lib_storage::StorageError;
use lib_types::Amount;
use thiserror::Error;

/// Error during ledger operations.
///
/// Every variant rejects exactly the call that raised it; ledger state is
/// never left partially applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid address: the zero address cannot be used here")]
    InvalidAddress,

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Unauthorized: caller is not the ledger owner")]
    Unauthorized,

    #[error("Ledger already initialized with a different genesis configuration")]
    AlreadyInitialized,

    #[error("Ledger not initialized: run genesis first")]
    NotInitialized,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Conservation invariant violated: {0}")]
    ConservationViolated(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
