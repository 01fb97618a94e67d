//! Meridian Token Ledger & Pool Governor
//!
//! This crate owns the authoritative record of balances and allowances for a
//! fixed-supply fungible token, plus the owner-gated governance surface that
//! repoints the two allocation pools.
//!
//! # Key Types
//!
//! - [`TokenLedger`]: the ledger aggregate and every state transition
//! - [`LedgerExecutor`]: serializes mutations and persists snapshots
//! - [`LedgerEvent`]: observable side effect of each transition
//! - [`LedgerError`]: typed rejection of a single call
//!
//! # Execution
//!
//! Drive the ledger through a [`LedgerExecutor`] over a
//! [`lib_storage::LedgerStore`] backend; every accepted operation is durable
//! before its event is published.

pub mod constants;
pub mod errors;
pub mod events;
pub mod executor;
pub mod ledger;

pub use constants::{POOL_ALLOCATION, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL, TOTAL_SUPPLY, UNIT};
pub use errors::{LedgerError, LedgerResult};
pub use events::{
    CapturingListener, LedgerEvent, LedgerEventListener, LedgerEventPublisher, PoolKind,
};
pub use executor::{GenesisConfig, LedgerExecutor, LEDGER_STATE_KEY};
pub use ledger::TokenLedger;
