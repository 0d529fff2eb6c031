//! Transaction manager for one container
//!
//! Tracks the bookkeeping shared by all transactions of a container:
//! 1. Transaction id allocation (one per attempt)
//! 2. Version allocation (one per commit)
//! 3. Commit/abort counters
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. begin()            - allocate TxnId, create proxy over a copy of the value
//! 2. runner(proxy)      - run by the container
//! 3. commit()           - resolve + invalidate proxy, allocate version
//! 4. install value      - container replaces its committed value
//! 5. notify observers   - container, still holding the gate
//! ```
//!
//! The manager does not serialize transactions itself; callers hold the
//! container's gate from step 1 to step 5, which is what keeps version order
//! equal to commit order.

use crate::factory::ProxyFactory;
use crate::transaction::Transaction;
use std::sync::atomic::{AtomicU64, Ordering};
use trackstate_core::{ContainerId, TxnId, Version};

/// Transaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionMetrics {
    /// Total committed transactions
    pub committed: u64,
    /// Total aborted transactions
    pub aborted: u64,
    /// Commit success rate (0.0 - 1.0); 1.0 when nothing ran yet
    pub commit_rate: f64,
}

/// Manages transaction lifecycle bookkeeping for one container
pub struct TransactionManager {
    container: ContainerId,

    /// Version of the committed value
    ///
    /// Starts at 0 and increments by exactly 1 per commit.
    version: AtomicU64,

    /// Next transaction ID
    next_txn_id: AtomicU64,

    committed: AtomicU64,
    aborted: AtomicU64,
    factory: ProxyFactory,

    /// Emit debug events for begin/commit
    trace_transactions: bool,
}

impl TransactionManager {
    /// Create a manager for `container` with transaction tracing enabled
    pub fn new(container: ContainerId) -> Self {
        Self::with_tracing(container, true)
    }

    /// Create a manager, choosing whether begin/commit events are traced
    ///
    /// Aborts are always traced.
    pub fn with_tracing(container: ContainerId, trace_transactions: bool) -> Self {
        TransactionManager {
            container,
            version: AtomicU64::new(0),
            next_txn_id: AtomicU64::new(1),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            factory: ProxyFactory::new(),
            trace_transactions,
        }
    }

    /// Container this manager belongs to
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Proxy factory used for every transaction
    pub fn factory(&self) -> &ProxyFactory {
        &self.factory
    }

    /// Version of the currently committed value
    pub fn current_version(&self) -> Version {
        Version::from(self.version.load(Ordering::SeqCst))
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> TxnId {
        TxnId::from(self.next_txn_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Start a transaction over a copy of `current`
    pub fn begin<T: Clone>(&self, current: &T) -> Transaction<'_, T> {
        let txn_id = self.next_txn_id();
        let proxy = self.factory.create_proxy(txn_id, current);
        if self.trace_transactions {
            tracing::debug!(container = %self.container, txn_id = %txn_id, "Transaction started");
        }
        Transaction::new(self, txn_id, proxy)
    }

    /// Record a successful resolution and allocate its version
    pub(crate) fn record_commit(&self, txn_id: TxnId) -> Version {
        let version = Version::from(self.version.fetch_add(1, Ordering::SeqCst)).next();
        self.committed.fetch_add(1, Ordering::Relaxed);
        if self.trace_transactions {
            tracing::debug!(
                container = %self.container,
                txn_id = %txn_id,
                version = %version,
                "Transaction committed"
            );
        }
        version
    }

    /// Record a discarded transaction
    pub(crate) fn record_abort(&self, txn_id: TxnId, reason: &str) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            container = %self.container,
            txn_id = %txn_id,
            reason = reason,
            "Transaction aborted"
        );
    }

    /// Snapshot of the transaction counters
    pub fn metrics(&self) -> TransactionMetrics {
        let committed = self.committed.load(Ordering::Relaxed);
        let aborted = self.aborted.load(Ordering::Relaxed);
        let total = committed + aborted;
        TransactionMetrics {
            committed,
            aborted,
            commit_rate: if total == 0 {
                1.0
            } else {
                committed as f64 / total as f64
            },
        }
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("container", &self.container)
            .field("version", &self.current_version())
            .field("metrics", &self.metrics())
            .finish()
    }
}
