//! Meridian ledger primitives.
//! Stable, behavior-free building blocks shared by every ledger crate.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod primitives;

pub use primitives::{Address, Amount};
