//! State container: the single source of truth for one value
//!
//! [`StateContainer`] composes the three building blocks:
//! - a [`ChangeTracker`] for observers,
//! - a [`TransactionManager`] (and its proxy factory) for isolation,
//! - a [`TransactionGate`] for FIFO serialization.
//!
//! ## Transaction State Machine
//!
//! ```text
//! Idle -> Running -> Committing -> Idle
//!                 \-> Aborting  -> Idle
//! ```
//!
//! 1. Reject re-entrant requests, then acquire the gate (queueing FIFO).
//! 2. Begin a transaction: allocate a TxnId, create a proxy over a copy of
//!    the committed value.
//! 3. Run the runner against the proxy (awaiting it for the async path).
//! 4. Ok: resolve + invalidate the proxy, install the value under the next
//!    version, notify observers, release the gate, return the result.
//! 5. Err: invalidate the proxy, leave the value alone, release the gate,
//!    return the runner's error inside [`TransactionError::Aborted`].
//!
//! A panicking runner or a dropped async transaction takes the abort path
//! through the transaction guard's drop handler.
//!
//! ## Re-entrancy
//!
//! Observers run while the gate is held. A transaction requested on the same
//! container from inside a runner or observer on the same thread fails with
//! [`TransactionError::Reentrant`]. `track` is always allowed; an observer
//! registered during delivery only sees later commits.

use crate::builder::{ContainerConfig, StateContainerBuilder};
use crate::metrics::ContainerMetrics;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use trackstate_concurrency::{
    scope, Scoped, Transaction, TransactionGate, TransactionManager, TxProxy,
};
use trackstate_core::{ContainerId, Trackable, TransactionError, TransactionTarget, Version};
use trackstate_tracker::{ChangeTracker, ObserverErrorHook, Untrack};

/// Committed value and the version it was committed under
struct Committed<T> {
    value: Arc<T>,
    version: Version,
}

struct ContainerInner<T> {
    id: ContainerId,
    name: String,
    committed: RwLock<Committed<T>>,
    tracker: ChangeTracker<T>,
    manager: TransactionManager,
    gate: TransactionGate,
}

/// A transactional, observable value
///
/// Cloning a `StateContainer` creates a new handle to the **same** value;
/// all handles share observers and the transaction queue.
///
/// # Example
///
/// ```ignore
/// use trackstate::prelude::*;
///
/// #[derive(Clone)]
/// struct Counter { count: i64 }
///
/// let state = StateContainer::new(Counter { count: 0 });
/// let untrack = state.track(|c: &Counter| println!("count = {}", c.count));
///
/// let count = state.transact(|p| {
///     p.write(|c| c.count += 1)?;
///     p.read(|c| c.count)
/// })?;
/// assert_eq!(count, 1);
/// untrack.untrack();
/// ```
pub struct StateContainer<T> {
    inner: Arc<ContainerInner<T>>,
}

impl<T> Clone for StateContainer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for StateContainer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("name", &self.inner.name)
            .field("version", &self.inner.committed.read().version)
            .field("observers", &self.inner.tracker.observer_count())
            .field("busy", &self.inner.gate.is_held())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> StateContainer<T> {
    /// Create a container holding `initial`, with default settings.
    pub fn new(initial: T) -> Self {
        StateContainerBuilder::new().build(initial)
    }

    /// Create a builder for container configuration.
    pub fn builder() -> StateContainerBuilder<T> {
        StateContainerBuilder::new()
    }

    pub(crate) fn from_config(
        config: ContainerConfig,
        observer_error_hook: Option<ObserverErrorHook>,
        initial: T,
    ) -> Self {
        let id = ContainerId::next();
        let name = config.name.unwrap_or_else(|| id.to_string());
        let tracker = match observer_error_hook {
            Some(hook) => ChangeTracker::with_error_hook(hook),
            None => ChangeTracker::new(),
        };
        tracing::debug!(container = %name, "State container created");

        Self {
            inner: Arc::new(ContainerInner {
                id,
                name,
                committed: RwLock::new(Committed {
                    value: Arc::new(initial),
                    version: Version::INITIAL,
                }),
                tracker,
                manager: TransactionManager::with_tracing(id, config.trace_transactions),
                gate: TransactionGate::new(id),
            }),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Container identity
    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    /// Label used in logs
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Clone of the committed value
    pub fn get(&self) -> T {
        self.inner.committed.read().value.as_ref().clone()
    }

    /// Shared snapshot of the committed value
    ///
    /// The snapshot is immutable; later commits install a new `Arc` and never
    /// change a snapshot already handed out.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.inner.committed.read().value)
    }

    /// Access the committed value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.snapshot();
        f(&value)
    }

    /// Version of the committed value (0 until the first commit)
    pub fn version(&self) -> Version {
        self.inner.committed.read().version
    }

    /// Check whether a transaction is in flight
    pub fn is_busy(&self) -> bool {
        self.inner.gate.is_held()
    }

    /// Number of active observers
    pub fn observer_count(&self) -> usize {
        self.inner.tracker.observer_count()
    }

    /// Get container metrics.
    pub fn metrics(&self) -> ContainerMetrics {
        let txn = self.inner.manager.metrics();
        ContainerMetrics {
            version: self.version(),
            transactions_committed: txn.committed,
            transactions_aborted: txn.aborted,
            observer_failures: self.inner.tracker.failure_count(),
            observers: self.inner.tracker.observer_count(),
            commit_rate: txn.commit_rate,
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register `callback` for every future committed value
    ///
    /// O(1) amortized. The callback receives the value by shared reference and
    /// cannot mutate it.
    pub fn track<F>(&self, callback: F) -> Untrack
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.tracker.register(callback)
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Run a synchronous transaction
    ///
    /// Blocks while earlier transactions are queued or running, including from
    /// `spawn_blocking` threads and workers of a multi-thread tokio runtime.
    /// On a current-thread runtime a contended call returns
    /// [`TransactionError::WouldBlock`] instead; use
    /// [`transact_async`](Self::transact_async) there.
    pub fn transact<R, E, F>(&self, runner: F) -> Result<R, TransactionError<E>>
    where
        F: FnOnce(TxProxy<T>) -> Result<R, E>,
    {
        self.check_reentrancy()?;
        let _permit = self.inner.gate.acquire_blocking()?;

        let txn = self.begin();
        let outcome = {
            let _scope = scope::enter(self.inner.id);
            runner(txn.proxy().clone())
        };
        self.finish(txn, outcome)
    }

    /// Run an asynchronous transaction
    ///
    /// Queues behind earlier transactions, then runs the runner's future to
    /// completion while holding the gate. Settles only after the outcome has
    /// been committed (and observers notified) or discarded. Dropping the
    /// returned future aborts the transaction.
    pub async fn transact_async<R, E, F, Fut>(&self, runner: F) -> Result<R, TransactionError<E>>
    where
        F: FnOnce(TxProxy<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        self.check_reentrancy()?;
        let _permit = self.inner.gate.acquire().await;

        let txn = self.begin();
        let pending = {
            let _scope = scope::enter(self.inner.id);
            runner(txn.proxy().clone())
        };
        let outcome = Scoped::new(self.inner.id, pending).await;
        self.finish(txn, outcome)
    }

    fn check_reentrancy<E>(&self) -> Result<(), TransactionError<E>> {
        if scope::is_active(self.inner.id) {
            tracing::warn!(container = %self.inner.name, "Rejected re-entrant transaction");
            return Err(TransactionError::Reentrant {
                container: self.inner.id,
            });
        }
        Ok(())
    }

    /// Start a transaction over the committed value. Caller holds the gate.
    fn begin(&self) -> Transaction<'_, T> {
        let committed = self.inner.committed.read();
        self.inner.manager.begin(committed.value.as_ref())
    }

    /// Commit or abort `txn` according to the runner's outcome. Caller holds
    /// the gate, which keeps observers ahead of the next transaction.
    fn finish<R, E>(
        &self,
        txn: Transaction<'_, T>,
        outcome: Result<R, E>,
    ) -> Result<R, TransactionError<E>> {
        match outcome {
            Ok(result) => {
                let (value, version) = txn.commit()?;
                let value = Arc::new(value);
                *self.inner.committed.write() = Committed {
                    value: Arc::clone(&value),
                    version,
                };

                let _scope = scope::enter(self.inner.id);
                let report = self.inner.tracker.notify(version, &value);
                if report.failed > 0 {
                    tracing::warn!(
                        container = %self.inner.name,
                        version = %version,
                        failed = report.failed,
                        delivered = report.delivered,
                        "Observers failed during notification"
                    );
                }
                Ok(result)
            }
            Err(cause) => {
                let txn_id = txn.txn_id();
                txn.abort("runner returned an error");
                Err(TransactionError::Aborted { txn_id, cause })
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Trackable<T> for StateContainer<T> {
    type Untrack = Untrack;

    fn track<F>(&self, callback: F) -> Untrack
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        StateContainer::track(self, callback)
    }
}

impl<T: Clone + Send + Sync + 'static> TransactionTarget<T> for StateContainer<T> {
    type Proxy = TxProxy<T>;

    fn transact<R, E, F>(&self, runner: F) -> Result<R, TransactionError<E>>
    where
        F: FnOnce(TxProxy<T>) -> Result<R, E>,
    {
        StateContainer::transact(self, runner)
    }

    fn transact_async<R, E, F, Fut>(
        &self,
        runner: F,
    ) -> impl Future<Output = Result<R, TransactionError<E>>> + Send
    where
        F: FnOnce(TxProxy<T>) -> Fut + Send,
        Fut: Future<Output = Result<R, E>> + Send,
        R: Send,
        E: Send,
    {
        StateContainer::transact_async(self, runner)
    }
}
