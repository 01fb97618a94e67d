//! Durable storage for the Meridian token ledger.
//!
//! The ledger executor persists its state through the [`LedgerStore`] trait,
//! which keeps the core semantics independent of the backend.
//!
//! # Backends
//!
//! - [`SledStore`]: production backend on the sled embedded database, with
//!   every write flushed to disk before the call returns
//! - [`MemoryStore`]: in-process backend for tests
//!
//! Both backends enforce the same key/value hygiene, so a suite that passes
//! against [`MemoryStore`] exercises the exact trait behavior [`SledStore`]
//! provides.

pub mod errors;
pub mod memory;
pub mod sled_store;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sled_store::SledStore;
pub use traits::{LedgerStore, MAX_KEY_SIZE, MAX_VALUE_SIZE};
