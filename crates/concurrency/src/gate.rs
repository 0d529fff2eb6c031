//! Transaction gate: FIFO serialization of transactions
//!
//! Only one transaction per container runs at a time, from gate acquisition
//! until its observers have been notified. Waiters are served strictly in
//! arrival order, sync and async alike, so commit order equals request order.
//!
//! The gate is a `tokio::sync::Mutex<()>`, which hands the lock to queued
//! waiters in FIFO order and supports both `.await` and blocking acquisition.
//!
//! ## Synchronous Acquisition
//!
//! 1. An uncontended gate is taken immediately without blocking.
//! 2. Outside any runtime, a contended gate is waited for by blocking the
//!    thread.
//! 3. Inside a multi-thread runtime (worker or blocking-pool thread) the wait
//!    goes through `block_in_place`, so the holder keeps making progress on
//!    the remaining workers.
//! 4. Inside a current-thread runtime the holder may need this very thread to
//!    finish, so the request fails with [`TransactionError::WouldBlock`].
//!    This includes that runtime's `spawn_blocking` threads, which cannot be
//!    told apart from its worker.

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, MutexGuard};
use trackstate_core::{ContainerId, TransactionError};

/// Exclusive right to run a transaction, released on drop
pub type GatePermit<'a> = MutexGuard<'a, ()>;

/// FIFO lock serializing the transactions of one container
#[derive(Debug)]
pub struct TransactionGate {
    container: ContainerId,
    lock: Mutex<()>,
}

impl TransactionGate {
    /// Create an open gate for `container`
    pub fn new(container: ContainerId) -> Self {
        Self {
            container,
            lock: Mutex::new(()),
        }
    }

    /// Wait for the gate
    pub async fn acquire(&self) -> GatePermit<'_> {
        self.lock.lock().await
    }

    /// Take the gate from synchronous code
    ///
    /// See the module docs for when this blocks and when it fails.
    pub fn acquire_blocking<E>(&self) -> Result<GatePermit<'_>, TransactionError<E>> {
        if let Ok(permit) = self.lock.try_lock() {
            return Ok(permit);
        }
        match Handle::try_current() {
            Err(_) => Ok(self.lock.blocking_lock()),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                Err(TransactionError::WouldBlock {
                    container: self.container,
                })
            }
            Ok(_) => Ok(tokio::task::block_in_place(|| self.lock.blocking_lock())),
        }
    }

    /// Check whether a transaction currently holds the gate
    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
