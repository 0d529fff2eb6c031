//! Transaction proxy: the runner's view of the value
//!
//! A [`TxProxy`] is a cloneable handle over the transaction's working copy.
//! Every read and write goes through it, so the transaction sees its own
//! writes while the committed value stays untouched until commit.
//!
//! ## Lifecycle
//!
//! ```text
//! Live { working, writes } --resolve--> Resolved
//!          |                               |
//!          +--------invalidate-------------+--> Invalidated
//! ```
//!
//! Once a proxy leaves `Live`, every access fails with [`StaleProxyError`].
//! Clones share the lifecycle, so a clone leaked out of the runner becomes
//! unusable the moment the transaction ends.
//!
//! Accessor closures run while the proxy is locked; they must not access the
//! same proxy again.

use parking_lot::Mutex;
use std::sync::Arc;
use trackstate_core::{StaleProxyError, TxnId};

enum ProxyState<T> {
    Live { working: T, writes: u64 },
    Resolved,
    Invalidated,
}

impl<T> ProxyState<T> {
    fn name(&self) -> &'static str {
        match self {
            ProxyState::Live { .. } => "live",
            ProxyState::Resolved => "resolved",
            ProxyState::Invalidated => "invalidated",
        }
    }
}

/// Transaction-scoped handle over a working copy of the value
pub struct TxProxy<T> {
    txn_id: TxnId,
    state: Arc<Mutex<ProxyState<T>>>,
}

impl<T> Clone for TxProxy<T> {
    fn clone(&self) -> Self {
        Self {
            txn_id: self.txn_id,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> std::fmt::Debug for TxProxy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxProxy")
            .field("txn_id", &self.txn_id)
            .field("state", &self.state.lock().name())
            .finish()
    }
}

impl<T> TxProxy<T> {
    pub(crate) fn new(txn_id: TxnId, working: T) -> Self {
        Self {
            txn_id,
            state: Arc::new(Mutex::new(ProxyState::Live { working, writes: 0 })),
        }
    }

    /// Transaction that owns this proxy
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Check whether the owning transaction is still running
    pub fn is_live(&self) -> bool {
        matches!(*self.state.lock(), ProxyState::Live { .. })
    }

    /// Number of write accesses made through this proxy
    ///
    /// Returns 0 once the proxy is no longer live.
    pub fn write_count(&self) -> u64 {
        match &*self.state.lock() {
            ProxyState::Live { writes, .. } => *writes,
            _ => 0,
        }
    }

    /// Read the working copy
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, StaleProxyError> {
        match &*self.state.lock() {
            ProxyState::Live { working, .. } => Ok(f(working)),
            _ => Err(StaleProxyError::new(self.txn_id)),
        }
    }

    /// Mutate the working copy
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, StaleProxyError> {
        match &mut *self.state.lock() {
            ProxyState::Live { working, writes } => {
                *writes += 1;
                Ok(f(working))
            }
            _ => Err(StaleProxyError::new(self.txn_id)),
        }
    }

    /// Overwrite the working copy
    pub fn set(&self, value: T) -> Result<(), StaleProxyError> {
        self.replace(value).map(drop)
    }

    /// Overwrite the working copy, returning the previous working value
    pub fn replace(&self, value: T) -> Result<T, StaleProxyError> {
        self.write(|working| std::mem::replace(working, value))
    }

    /// Take the working copy out, leaving the proxy resolved
    pub(crate) fn take(&self) -> Result<T, StaleProxyError> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, ProxyState::Resolved) {
            ProxyState::Live { working, .. } => Ok(working),
            other => {
                *state = other;
                Err(StaleProxyError::new(self.txn_id))
            }
        }
    }

    /// Make the proxy permanently unusable
    ///
    /// Returns `true` if a working copy was discarded.
    pub(crate) fn invalidate(&self) -> bool {
        let previous = std::mem::replace(&mut *self.state.lock(), ProxyState::Invalidated);
        matches!(previous, ProxyState::Live { .. })
    }
}

impl<T: Clone> TxProxy<T> {
    /// Clone of the working copy
    pub fn get(&self) -> Result<T, StaleProxyError> {
        self.read(T::clone)
    }
}
