//! TokenLedger - balances, allowances, and the pool governor
//!
//! The canonical ledger aggregate. All value movement in the system goes
//! through the methods on [`TokenLedger`]; nothing else touches balances.
//!
//! # Invariants
//!
//! - `sum(balances) == total_supply` after every operation
//! - `total_supply + total_burned == TOTAL_SUPPLY` at all times
//! - owner and pool addresses are never the zero address
//! - every operation validates before it mutates: a failed call changes
//!   nothing
//!
//! # Storage
//!
//! Uses `BTreeMap` for deterministic serialization of the persisted snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_types::{Address, Amount};

use crate::constants::{POOL_ALLOCATION, TOTAL_SUPPLY};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{LedgerEvent, PoolKind};

/// The token ledger and pool governor.
///
/// Fields are private: the conservation invariant holds exactly because
/// every mutation funnels through the operations below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Address with exclusive rights over the pool governor
    owner: Address,

    /// DAO treasury pool address (governance-mutable reference; off-chain
    /// allocation logic reads it to know where to send future allocations)
    dao_pool: Address,

    /// Contributor pool address (governance-mutable reference)
    contributor_pool: Address,

    /// Supply currently in circulation
    total_supply: Amount,

    /// Cumulative amount removed from circulation
    total_burned: Amount,

    /// Account balances
    balances: BTreeMap<Address, Amount>,

    /// Granted allowances: account -> (spender -> amount)
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
}

impl TokenLedger {
    // ─── Genesis ────────────────────────────────────────────────────────

    /// Create the ledger, minting the full fixed supply split evenly
    /// between the two pools.
    ///
    /// # Errors
    /// - `LedgerError::InvalidAddress` if the deployer or either pool is
    ///   the zero address
    pub fn genesis(
        deployer: Address,
        dao_pool: Address,
        contributor_pool: Address,
    ) -> LedgerResult<Self> {
        if deployer.is_zero() || dao_pool.is_zero() || contributor_pool.is_zero() {
            return Err(LedgerError::InvalidAddress);
        }

        // Both allocations land on one account when the pools coincide
        let mut balances: BTreeMap<Address, Amount> = BTreeMap::new();
        *balances.entry(dao_pool).or_default() += POOL_ALLOCATION;
        *balances.entry(contributor_pool).or_default() += POOL_ALLOCATION;

        Ok(Self {
            owner: deployer,
            dao_pool,
            contributor_pool,
            total_supply: TOTAL_SUPPLY,
            total_burned: 0,
            balances,
            allowances: BTreeMap::new(),
        })
    }

    // ─── Views ──────────────────────────────────────────────────────────

    /// Balance of an account (0 for unknown accounts)
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining allowance `owner` has granted `spender` (0 if none)
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Current governor owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current DAO pool address
    pub fn dao_pool(&self) -> Address {
        self.dao_pool
    }

    /// Current contributor pool address
    pub fn contributor_pool(&self) -> Address {
        self.contributor_pool
    }

    /// Supply currently in circulation
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Cumulative burned amount
    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|balance| **balance > 0).count()
    }

    // ─── Transfers ──────────────────────────────────────────────────────

    /// Move `amount` from `from` to `to`.
    ///
    /// Zero-amount and self-transfers are legal no-ops that still report
    /// the event.
    ///
    /// # Errors
    /// - `LedgerError::InvalidAddress` if `to` is the zero address
    /// - `LedgerError::InsufficientBalance` if `from` holds less than
    ///   `amount`
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerEvent> {
        if to.is_zero() {
            return Err(LedgerError::InvalidAddress);
        }

        let have = self.balance_of(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }

        let event = LedgerEvent::Transfer { from, to, amount };
        if from == to {
            return Ok(event);
        }

        // Compute both sides before touching the map
        let debited = have.checked_sub(amount).ok_or(LedgerError::Underflow)?;
        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from, debited);
        self.balances.insert(to, credited);

        Ok(event)
    }

    /// Set the allowance `spender` may draw from `owner`, overwriting any
    /// prior value. No balance check applies.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) -> LedgerEvent {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
        LedgerEvent::Approval {
            owner,
            spender,
            amount,
        }
    }

    /// Move `amount` from `from` to `to`, drawing on the allowance `from`
    /// granted `spender`.
    ///
    /// The allowance is debited only once the transfer has succeeded, so a
    /// failed call leaves both the allowance and the balances untouched.
    ///
    /// # Errors
    /// - `LedgerError::InsufficientAllowance` if the grant is below
    ///   `amount`
    /// - plus every failure mode of [`TokenLedger::transfer`]
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerEvent> {
        let granted = self.allowance(&from, &spender);
        if granted < amount {
            return Err(LedgerError::InsufficientAllowance {
                have: granted,
                need: amount,
            });
        }

        let event = self.transfer(from, to, amount)?;

        let remaining = granted.checked_sub(amount).ok_or(LedgerError::Underflow)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(spender, remaining);

        Ok(event)
    }

    // ─── Burn ───────────────────────────────────────────────────────────

    /// Permanently remove `amount` of `from`'s balance from circulation.
    ///
    /// # Errors
    /// - `LedgerError::InsufficientBalance` if `from` holds less than
    ///   `amount`
    pub fn burn(&mut self, from: Address, amount: Amount) -> LedgerResult<LedgerEvent> {
        let have = self.balance_of(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }

        let debited = have.checked_sub(amount).ok_or(LedgerError::Underflow)?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Underflow)?;
        let burned = self
            .total_burned
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from, debited);
        self.total_supply = supply;
        self.total_burned = burned;

        Ok(LedgerEvent::Burn { from, amount })
    }

    // ─── Pool Governor ──────────────────────────────────────────────────

    /// Repoint the DAO pool. Owner only. Moves no balances.
    ///
    /// # Errors
    /// - `LedgerError::Unauthorized` if `caller` is not the owner
    /// - `LedgerError::InvalidAddress` if `new_address` is the zero address
    pub fn update_dao_pool(
        &mut self,
        caller: Address,
        new_address: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.require_owner(&caller)?;
        if new_address.is_zero() {
            return Err(LedgerError::InvalidAddress);
        }

        let previous = self.dao_pool;
        self.dao_pool = new_address;
        Ok(LedgerEvent::PoolReassigned {
            pool: PoolKind::Dao,
            previous,
            new: new_address,
        })
    }

    /// Repoint the contributor pool. Owner only. Moves no balances.
    ///
    /// # Errors
    /// - `LedgerError::Unauthorized` if `caller` is not the owner
    /// - `LedgerError::InvalidAddress` if `new_address` is the zero address
    pub fn update_contributor_pool(
        &mut self,
        caller: Address,
        new_address: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.require_owner(&caller)?;
        if new_address.is_zero() {
            return Err(LedgerError::InvalidAddress);
        }

        let previous = self.contributor_pool;
        self.contributor_pool = new_address;
        Ok(LedgerEvent::PoolReassigned {
            pool: PoolKind::Contributor,
            previous,
            new: new_address,
        })
    }

    /// Hand control of the governor to `new_owner`. Owner only.
    ///
    /// # Errors
    /// - `LedgerError::Unauthorized` if `caller` is not the owner
    /// - `LedgerError::InvalidAddress` if `new_owner` is the zero address
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.require_owner(&caller)?;
        if new_owner.is_zero() {
            return Err(LedgerError::InvalidAddress);
        }

        let previous = self.owner;
        self.owner = new_owner;
        Ok(LedgerEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        })
    }

    fn require_owner(&self, caller: &Address) -> LedgerResult<()> {
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    // ─── Invariants ─────────────────────────────────────────────────────

    /// Verify the conservation invariants.
    ///
    /// # Errors
    /// - `LedgerError::ConservationViolated` if the sum of balances
    ///   diverges from circulating supply, or circulating plus burned
    ///   diverges from the fixed genesis supply
    pub fn check_conservation(&self) -> LedgerResult<()> {
        let mut circulating: Amount = 0;
        for balance in self.balances.values() {
            circulating = circulating
                .checked_add(*balance)
                .ok_or(LedgerError::Overflow)?;
        }

        if circulating != self.total_supply {
            return Err(LedgerError::ConservationViolated(format!(
                "sum of balances ({}) != total supply ({})",
                circulating, self.total_supply
            )));
        }

        let minted = self
            .total_supply
            .checked_add(self.total_burned)
            .ok_or(LedgerError::Overflow)?;
        if minted != TOTAL_SUPPLY {
            return Err(LedgerError::ConservationViolated(format!(
                "total supply ({}) + burned ({}) != genesis supply ({})",
                self.total_supply, self.total_burned, TOTAL_SUPPLY
            )));
        }

        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(id: u8) -> Address {
        Address::new([id; 32])
    }

    /// Ledger with owner addr(1), dao pool addr(2), contributor pool addr(3)
    fn test_ledger() -> TokenLedger {
        TokenLedger::genesis(addr(1), addr(2), addr(3)).expect("genesis")
    }

    #[test]
    fn test_genesis_mints_half_to_each_pool() {
        let ledger = test_ledger();

        assert_eq!(ledger.total_supply(), TOTAL_SUPPLY);
        assert_eq!(ledger.total_burned(), 0);
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION);
        assert_eq!(ledger.balance_of(&addr(3)), POOL_ALLOCATION);
        assert_eq!(ledger.owner(), addr(1));
        assert_eq!(ledger.holder_count(), 2);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_genesis_rejects_zero_addresses() {
        assert_eq!(
            TokenLedger::genesis(addr(1), Address::zero(), addr(3)),
            Err(LedgerError::InvalidAddress)
        );
        assert_eq!(
            TokenLedger::genesis(addr(1), addr(2), Address::zero()),
            Err(LedgerError::InvalidAddress)
        );
        assert_eq!(
            TokenLedger::genesis(Address::zero(), addr(2), addr(3)),
            Err(LedgerError::InvalidAddress)
        );
    }

    #[test]
    fn test_genesis_with_coinciding_pools_merges_allocation() {
        let ledger = TokenLedger::genesis(addr(1), addr(2), addr(2)).unwrap();
        assert_eq!(ledger.balance_of(&addr(2)), TOTAL_SUPPLY);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = test_ledger();

        let event = ledger.transfer(addr(2), addr(4), 200).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: addr(2),
                to: addr(4),
                amount: 200
            }
        );
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION - 200);
        assert_eq!(ledger.balance_of(&addr(4)), 200);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_insufficient_balance_changes_nothing() {
        let mut ledger = test_ledger();

        let result = ledger.transfer(addr(4), addr(5), 1);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance { have: 0, need: 1 })
        );
        assert_eq!(ledger.balance_of(&addr(4)), 0);
        assert_eq!(ledger.balance_of(&addr(5)), 0);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let mut ledger = test_ledger();
        assert_eq!(
            ledger.transfer(addr(2), Address::zero(), 1),
            Err(LedgerError::InvalidAddress)
        );
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION);
    }

    #[test]
    fn test_self_transfer_is_a_noop() {
        let mut ledger = test_ledger();
        ledger.transfer(addr(2), addr(2), 500).unwrap();
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_zero_amount_transfer_is_legal() {
        let mut ledger = test_ledger();
        let event = ledger.transfer(addr(4), addr(5), 0).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: addr(4),
                to: addr(5),
                amount: 0
            }
        );
    }

    #[test]
    fn test_approve_overwrites_prior_grant() {
        let mut ledger = test_ledger();

        ledger.approve(addr(2), addr(4), 100);
        assert_eq!(ledger.allowance(&addr(2), &addr(4)), 100);

        ledger.approve(addr(2), addr(4), 30);
        assert_eq!(ledger.allowance(&addr(2), &addr(4)), 30);
    }

    #[test]
    fn test_approve_without_balance_is_legal() {
        let mut ledger = test_ledger();
        ledger.approve(addr(9), addr(4), 1_000_000);
        assert_eq!(ledger.allowance(&addr(9), &addr(4)), 1_000_000);
    }

    #[test]
    fn test_transfer_from_debits_allowance_and_balance() {
        let mut ledger = test_ledger();

        ledger.approve(addr(2), addr(4), 100);
        ledger.transfer_from(addr(4), addr(2), addr(5), 60).unwrap();

        assert_eq!(ledger.allowance(&addr(2), &addr(4)), 40);
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION - 60);
        assert_eq!(ledger.balance_of(&addr(5)), 60);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut ledger = test_ledger();

        ledger.approve(addr(2), addr(4), 50);
        let result = ledger.transfer_from(addr(4), addr(2), addr(5), 60);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientAllowance { have: 50, need: 60 })
        );
        assert_eq!(ledger.allowance(&addr(2), &addr(4)), 50);
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION);
    }

    #[test]
    fn test_transfer_from_failed_transfer_keeps_allowance() {
        let mut ledger = test_ledger();

        // addr(9) grants more than it holds; the balance check must fire
        // and the allowance must survive untouched
        ledger.approve(addr(9), addr(4), 500);
        let result = ledger.transfer_from(addr(4), addr(9), addr(5), 500);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance { have: 0, need: 500 })
        );
        assert_eq!(ledger.allowance(&addr(9), &addr(4)), 500);

        // Same for a zero recipient
        ledger.approve(addr(2), addr(4), 500);
        let result = ledger.transfer_from(addr(4), addr(2), Address::zero(), 500);
        assert_eq!(result, Err(LedgerError::InvalidAddress));
        assert_eq!(ledger.allowance(&addr(2), &addr(4)), 500);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_burn_reduces_supply_permanently() {
        let mut ledger = test_ledger();

        let event = ledger.burn(addr(2), 1_000).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Burn {
                from: addr(2),
                amount: 1_000
            }
        );
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION - 1_000);
        assert_eq!(ledger.total_supply(), TOTAL_SUPPLY - 1_000);
        assert_eq!(ledger.total_burned(), 1_000);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_burn_beyond_balance_rejected() {
        let mut ledger = test_ledger();

        ledger.transfer(addr(2), addr(4), 100).unwrap();
        ledger.burn(addr(4), 80).unwrap();

        // A second identical burn now exceeds the remaining balance
        let result = ledger.burn(addr(4), 80);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance { have: 20, need: 80 })
        );
        assert_eq!(ledger.balance_of(&addr(4)), 20);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_update_dao_pool_owner_only() {
        let mut ledger = test_ledger();

        let result = ledger.update_dao_pool(addr(7), addr(8));
        assert_eq!(result, Err(LedgerError::Unauthorized));
        assert_eq!(ledger.dao_pool(), addr(2));

        let event = ledger.update_dao_pool(addr(1), addr(8)).unwrap();
        assert_eq!(
            event,
            LedgerEvent::PoolReassigned {
                pool: PoolKind::Dao,
                previous: addr(2),
                new: addr(8),
            }
        );
        assert_eq!(ledger.dao_pool(), addr(8));
    }

    #[test]
    fn test_update_contributor_pool_owner_only() {
        let mut ledger = test_ledger();

        assert_eq!(
            ledger.update_contributor_pool(addr(7), addr(8)),
            Err(LedgerError::Unauthorized)
        );

        ledger.update_contributor_pool(addr(1), addr(8)).unwrap();
        assert_eq!(ledger.contributor_pool(), addr(8));
    }

    #[test]
    fn test_update_pool_rejects_zero_address() {
        let mut ledger = test_ledger();

        assert_eq!(
            ledger.update_dao_pool(addr(1), Address::zero()),
            Err(LedgerError::InvalidAddress)
        );
        assert_eq!(ledger.dao_pool(), addr(2));
    }

    #[test]
    fn test_pool_update_moves_no_balances() {
        let mut ledger = test_ledger();

        ledger.update_dao_pool(addr(1), addr(8)).unwrap();
        assert_eq!(ledger.balance_of(&addr(2)), POOL_ALLOCATION);
        assert_eq!(ledger.balance_of(&addr(8)), 0);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn test_ownership_handoff_regates_governor() {
        let mut ledger = test_ledger();

        let event = ledger.transfer_ownership(addr(1), addr(7)).unwrap();
        assert_eq!(
            event,
            LedgerEvent::OwnershipTransferred {
                previous: addr(1),
                new: addr(7),
            }
        );

        // The previous owner lost the gate; the new owner holds it
        assert_eq!(
            ledger.update_dao_pool(addr(1), addr(8)),
            Err(LedgerError::Unauthorized)
        );
        ledger.update_dao_pool(addr(7), addr(8)).unwrap();
        assert_eq!(ledger.dao_pool(), addr(8));
    }

    #[test]
    fn test_transfer_ownership_rejects_zero_owner() {
        let mut ledger = test_ledger();
        assert_eq!(
            ledger.transfer_ownership(addr(1), Address::zero()),
            Err(LedgerError::InvalidAddress)
        );
        assert_eq!(ledger.owner(), addr(1));
    }

    #[test]
    fn test_conservation_across_mixed_sequence() {
        let mut ledger = test_ledger();

        ledger.transfer(addr(2), addr(4), 1_000).unwrap();
        ledger.approve(addr(4), addr(5), 600);
        ledger.transfer_from(addr(5), addr(4), addr(6), 600).unwrap();
        ledger.burn(addr(6), 250).unwrap();
        ledger.transfer(addr(3), addr(6), 42).unwrap();
        ledger.burn(addr(2), 1).unwrap();

        assert_eq!(ledger.total_supply(), TOTAL_SUPPLY - 251);
        assert_eq!(ledger.total_burned(), 251);
        ledger.check_conservation().unwrap();
    }
}
