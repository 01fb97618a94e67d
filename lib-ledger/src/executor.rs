//! Ledger Executor - serialized, durable application of ledger operations
//!
//! [`LedgerExecutor`] is the single write path to the ledger: it owns the
//! storage backend, lazily loads the persisted snapshot, applies each
//! mutation, and publishes the resulting event. Callers sharing an executor
//! across tasks put it behind one `Arc<RwLock<_>>` (or a single owning task);
//! `&mut self` on every mutating method keeps the operation order total.
//!
//! # Atomicity
//!
//! Each mutation runs on a working copy of the ledger. The copy is installed
//! in memory only after the serialized snapshot is durably written, so a
//! rejected operation or a storage failure leaves both the in-memory and the
//! persisted state exactly as they were.
//!
//! # Genesis
//!
//! Initialization is explicit and idempotent: replaying genesis with the
//! same configuration is a no-op, replaying it with a different one is an
//! error, and every other operation refuses to run before genesis.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lib_storage::LedgerStore;
use lib_types::{Address, Amount};

use crate::constants::POOL_ALLOCATION;
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{LedgerEvent, LedgerEventPublisher};
use crate::ledger::TokenLedger;

/// Fixed, versioned storage key for the singleton ledger snapshot
pub const LEDGER_STATE_KEY: &[u8] = b"ledger:meridian:v1";

/// Genesis parameters for the ledger.
///
/// Persisted alongside the ledger so a replayed initialization can be told
/// apart from a conflicting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Deployer; becomes the governor owner
    pub deployer: Address,
    /// Initial DAO pool address
    pub dao_pool: Address,
    /// Initial contributor pool address
    pub contributor_pool: Address,
}

/// The snapshot written to storage: the genesis parameters plus the ledger
/// state they produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedLedger {
    genesis: GenesisConfig,
    ledger: TokenLedger,
}

/// Single write path to the durable token ledger.
pub struct LedgerExecutor<S: LedgerStore> {
    store: S,
    /// In-memory snapshot; lazily loaded from storage on first access
    state: Option<PersistedLedger>,
    publisher: LedgerEventPublisher,
}

impl<S: LedgerStore> LedgerExecutor<S> {
    /// Create an executor over a storage backend
    pub fn new(store: S) -> Self {
        Self::with_publisher(store, LedgerEventPublisher::new())
    }

    /// Create an executor that publishes through an existing publisher
    pub fn with_publisher(store: S, publisher: LedgerEventPublisher) -> Self {
        Self {
            store,
            state: None,
            publisher,
        }
    }

    /// The event publisher this executor notifies
    pub fn publisher(&self) -> &LedgerEventPublisher {
        &self.publisher
    }

    // ─── Genesis ────────────────────────────────────────────────────────

    /// Initialize the ledger, minting the fixed supply into the two pools.
    ///
    /// Publishes the two mint transfers (from the zero address) on first
    /// initialization only.
    ///
    /// # Errors
    /// - `LedgerError::InvalidAddress` if any configured address is zero
    /// - `LedgerError::AlreadyInitialized` if a snapshot with a different
    ///   genesis configuration already exists
    /// - `LedgerError::Storage` if the backend fails
    pub async fn init_genesis(&mut self, config: GenesisConfig) -> LedgerResult<()> {
        if let Some(raw) = self.store.get(LEDGER_STATE_KEY)? {
            let existing = decode(&raw)?;
            if existing.genesis != config {
                return Err(LedgerError::AlreadyInitialized);
            }
            // Idempotent replay of the same genesis
            self.state = Some(existing);
            return Ok(());
        }

        let ledger = TokenLedger::genesis(config.deployer, config.dao_pool, config.contributor_pool)?;
        let snapshot = PersistedLedger {
            genesis: config,
            ledger,
        };
        self.persist(&snapshot)?;
        self.state = Some(snapshot);
        info!(owner = %config.deployer, "ledger initialized");

        for pool in [config.dao_pool, config.contributor_pool] {
            self.publisher
                .publish(LedgerEvent::Transfer {
                    from: Address::zero(),
                    to: pool,
                    amount: POOL_ALLOCATION,
                })
                .await;
        }
        Ok(())
    }

    /// Whether a ledger snapshot exists in storage
    pub fn is_initialized(&self) -> LedgerResult<bool> {
        Ok(self.store.exists(LEDGER_STATE_KEY)?)
    }

    // ─── Operations ─────────────────────────────────────────────────────

    /// Move `amount` from `from` to `to`
    pub async fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.transfer(from, to, amount)).await
    }

    /// Set the allowance `spender` may draw from `owner`
    pub async fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| Ok(ledger.approve(owner, spender, amount)))
            .await
    }

    /// Spend `from`'s balance on behalf of `spender`, within the allowance
    pub async fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.transfer_from(spender, from, to, amount))
            .await
    }

    /// Burn `amount` of `from`'s own balance
    pub async fn burn(&mut self, from: Address, amount: Amount) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.burn(from, amount)).await
    }

    /// Repoint the DAO pool (owner only)
    pub async fn update_dao_pool(
        &mut self,
        caller: Address,
        new_address: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.update_dao_pool(caller, new_address))
            .await
    }

    /// Repoint the contributor pool (owner only)
    pub async fn update_contributor_pool(
        &mut self,
        caller: Address,
        new_address: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.update_contributor_pool(caller, new_address))
            .await
    }

    /// Hand the governor to a new owner (owner only)
    pub async fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> LedgerResult<LedgerEvent> {
        self.apply(|ledger| ledger.transfer_ownership(caller, new_owner))
            .await
    }

    // ─── Views ──────────────────────────────────────────────────────────

    /// Balance of an account
    pub fn balance_of(&mut self, account: &Address) -> LedgerResult<Amount> {
        Ok(self.get_or_load()?.ledger.balance_of(account))
    }

    /// Remaining allowance `owner` has granted `spender`
    pub fn allowance(&mut self, owner: &Address, spender: &Address) -> LedgerResult<Amount> {
        Ok(self.get_or_load()?.ledger.allowance(owner, spender))
    }

    /// Read access to the full ledger state
    pub fn ledger(&mut self) -> LedgerResult<&TokenLedger> {
        Ok(&self.get_or_load()?.ledger)
    }

    // ─── Internals ──────────────────────────────────────────────────────

    /// Run one mutation with the commit discipline: working copy, durable
    /// write, install, publish.
    async fn apply<F>(&mut self, op: F) -> LedgerResult<LedgerEvent>
    where
        F: FnOnce(&mut TokenLedger) -> LedgerResult<LedgerEvent>,
    {
        self.get_or_load()?;
        let mut working = self
            .state
            .clone()
            .expect("ledger must be in memory after successful load");

        let event = op(&mut working.ledger)?;
        self.persist(&working)?;
        self.state = Some(working);

        debug!(%event, "ledger operation applied");
        self.publisher.publish(event.clone()).await;
        Ok(event)
    }

    /// Load the snapshot from storage if it is not in memory yet
    fn get_or_load(&mut self) -> LedgerResult<&PersistedLedger> {
        if self.state.is_none() {
            let raw = self
                .store
                .get(LEDGER_STATE_KEY)?
                .ok_or(LedgerError::NotInitialized)?;
            self.state = Some(decode(&raw)?);
        }
        Ok(self
            .state
            .as_ref()
            .expect("ledger must be in memory after successful load"))
    }

    fn persist(&self, snapshot: &PersistedLedger) -> LedgerResult<()> {
        let raw = encode(snapshot)?;
        self.store.set(LEDGER_STATE_KEY, &raw)?;
        Ok(())
    }
}

fn encode(snapshot: &PersistedLedger) -> LedgerResult<Vec<u8>> {
    bincode::serialize(snapshot).map_err(|e| LedgerError::Storage(format!("snapshot encode: {e}")))
}

fn decode(raw: &[u8]) -> LedgerResult<PersistedLedger> {
    bincode::deserialize(raw).map_err(|e| LedgerError::Storage(format!("snapshot decode: {e}")))
}

// ============================================================================
// UNIT TESTS
// ============================================================================
