//! Ledger Event Emission
//!
//! Every accepted state transition produces a [`LedgerEvent`]. Off-chain
//! consumers (allocation tooling watching the pool addresses, indexers,
//! audit logs) subscribe through [`LedgerEventPublisher`] and receive each
//! event after the transition has been persisted.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use lib_types::{Address, Amount};

// ============================================================================
// EVENT TYPES
// ============================================================================

/// The two named allocation pools held by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolKind {
    /// DAO treasury allocation
    Dao,
    /// Contributor allocation
    Contributor,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Dao => write!(f, "dao"),
            PoolKind::Contributor => write!(f, "contributor"),
        }
    }
}

/// Observable side effect of a ledger state transition.
///
/// Genesis minting is reported as a [`LedgerEvent::Transfer`] from the zero
/// address, the usual fungible-token convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Value moved between two accounts
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// An account granted (or overwrote) a spending allowance
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },

    /// An account permanently removed value from circulation
    Burn { from: Address, amount: Amount },

    /// The owner repointed one of the allocation pools
    PoolReassigned {
        pool: PoolKind,
        previous: Address,
        new: Address,
    },

    /// The owner handed control of the governor to another address
    OwnershipTransferred { previous: Address, new: Address },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Transfer { from, to, amount } => {
                write!(f, "Transfer({:?} -> {:?}, {})", from, to, amount)
            }
            LedgerEvent::Approval {
                owner,
                spender,
                amount,
            } => write!(f, "Approval({:?} grants {:?} up to {})", owner, spender, amount),
            LedgerEvent::Burn { from, amount } => write!(f, "Burn({:?}, {})", from, amount),
            LedgerEvent::PoolReassigned {
                pool,
                previous,
                new,
            } => write!(f, "PoolReassigned({}: {:?} -> {:?})", pool, previous, new),
            LedgerEvent::OwnershipTransferred { previous, new } => {
                write!(f, "OwnershipTransferred({:?} -> {:?})", previous, new)
            }
        }
    }
}

// ============================================================================
// EVENT LISTENER TRAIT
// ============================================================================

/// Trait for entities that listen to ledger events.
///
/// `on_event` is async so listeners can forward events without blocking the
/// publisher or each other.
#[async_trait]
pub trait LedgerEventListener: Send {
    /// Called once per published event, in subscription order
    async fn on_event(&mut self, event: LedgerEvent) -> Result<()>;
}

// ============================================================================
// EVENT PUBLISHER
// ============================================================================

/// Thread-safe fan-out of ledger events to subscribed listeners.
///
/// A failing listener is logged and skipped; it never blocks the ledger
/// operation or the remaining listeners.
#[derive(Clone, Default)]
pub struct LedgerEventPublisher {
    listeners: Arc<Mutex<Vec<Box<dyn LedgerEventListener>>>>,
}

impl fmt::Debug for LedgerEventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerEventPublisher").finish()
    }
}

impl LedgerEventPublisher {
    /// Create a publisher with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to ledger events
    pub async fn subscribe(&self, listener: Box<dyn LedgerEventListener>) {
        let mut listeners = self.listeners.lock().await;
        listeners.push(listener);
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: LedgerEvent) {
        let mut listeners = self.listeners.lock().await;
        for listener in listeners.iter_mut() {
            if let Err(e) = listener.on_event(event.clone()).await {
                tracing::warn!("ledger event listener error: {e}");
            }
        }
    }

    /// Number of subscribed listeners
    pub async fn listener_count(&self) -> usize {
        self.listeners.lock().await.len()
    }
}

// ============================================================================
// CAPTURING LISTENER
// ============================================================================

/// Listener that records every event it receives, for tests and audits
#[derive(Debug, Clone, Default)]
pub struct CapturingListener {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl CapturingListener {
    /// Create a listener with an empty capture buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured events
    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl LedgerEventListener for CapturingListener {
    async fn on_event(&mut self, event: LedgerEvent) -> Result<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn addr(id: u8) -> Address {
        Address::new([id; 32])
    }

    fn sample_event() -> LedgerEvent {
        LedgerEvent::Transfer {
            from: addr(1),
            to: addr(2),
            amount: 500,
        }
    }

    /// Listener that always fails, for isolation tests
    struct FailingListener;

    #[async_trait]
    impl LedgerEventListener for FailingListener {
        async fn on_event(&mut self, _event: LedgerEvent) -> Result<()> {
            Err(anyhow!("listener down"))
        }
    }

    #[tokio::test]
    async fn test_publisher_starts_empty() {
        let publisher = LedgerEventPublisher::new();
        assert_eq!(publisher.listener_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_and_publish() {
        let publisher = LedgerEventPublisher::new();
        let listener = CapturingListener::new();
        publisher.subscribe(Box::new(listener.clone())).await;
        assert_eq!(publisher.listener_count().await, 1);

        publisher.publish(sample_event()).await;

        let events = listener.events().await;
        assert_eq!(events, vec![sample_event()]);
    }

    #[tokio::test]
    async fn test_all_listeners_receive_each_event() {
        let publisher = LedgerEventPublisher::new();
        let first = CapturingListener::new();
        let second = CapturingListener::new();
        publisher.subscribe(Box::new(first.clone())).await;
        publisher.subscribe(Box::new(second.clone())).await;

        publisher.publish(sample_event()).await;

        assert_eq!(first.events().await.len(), 1);
        assert_eq!(second.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_listener_does_not_block_others() {
        let publisher = LedgerEventPublisher::new();
        let surviving = CapturingListener::new();
        publisher.subscribe(Box::new(FailingListener)).await;
        publisher.subscribe(Box::new(surviving.clone())).await;

        publisher.publish(sample_event()).await;

        assert_eq!(surviving.events().await, vec![sample_event()]);
    }

    #[test]
    fn test_event_display() {
        let rendered = format!(
            "{}",
            LedgerEvent::PoolReassigned {
                pool: PoolKind::Dao,
                previous: addr(2),
                new: addr(9),
            }
        );
        assert!(rendered.starts_with("PoolReassigned(dao:"));
    }
}
