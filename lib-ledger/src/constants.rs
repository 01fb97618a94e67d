//! Canonical Meridian Token Constants — Single Source of Truth
//!
//! ALL token-denomination constants MUST be defined here. No other file
//! should define supply or decimal constants; only re-export from this
//! module.
//!
//! `TOTAL_SUPPLY` is minted exactly once at genesis and persisted via bincode
//! in the ledger snapshot. Changing it would make existing snapshots violate
//! the conservation invariant on load.

use lib_types::Amount;

/// Token name
pub const TOKEN_NAME: &str = "Meridian";

/// Token symbol
pub const TOKEN_SYMBOL: &str = "MRD";

/// Number of decimal places (1 MRD = 10^18 base units)
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole token in base units
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Fixed total supply: 1,000,000,000 MRD in base units.
/// Minted in full at genesis; only burns may reduce it afterwards.
pub const TOTAL_SUPPLY: Amount = 1_000_000_000 * UNIT;

/// Share minted to each of the two pools at genesis
pub const POOL_ALLOCATION: Amount = TOTAL_SUPPLY / 2;
