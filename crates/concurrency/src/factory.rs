//! Proxy factory
//!
//! Strategy: deep copy. [`ProxyFactory::create_proxy`] clones the committed
//! value into the proxy's working copy; the runner mutates the copy directly
//! and [`ProxyFactory::resolve`] moves it out as the value to commit. The
//! committed value is never touched before commit, so aborting is just
//! dropping the copy.

use crate::proxy::TxProxy;
use trackstate_core::{StaleProxyError, TxnId};

/// Creates, resolves and invalidates transaction proxies
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyFactory;

impl ProxyFactory {
    /// Create a factory
    pub fn new() -> Self {
        ProxyFactory
    }

    /// Create a live proxy over a copy of `current`
    pub fn create_proxy<T: Clone>(&self, txn_id: TxnId, current: &T) -> TxProxy<T> {
        TxProxy::new(txn_id, current.clone())
    }

    /// Obtain the value to commit
    ///
    /// Fails with [`StaleProxyError`] if the proxy was already resolved or
    /// invalidated, so a proxy can never be resolved twice.
    pub fn resolve<T>(&self, proxy: &TxProxy<T>) -> Result<T, StaleProxyError> {
        proxy.take()
    }

    /// Make `proxy` (and all of its clones) permanently unusable
    ///
    /// Idempotent. Returns `true` only if the proxy was still live, i.e. an
    /// unresolved working copy was discarded. A proxy that was already
    /// resolved or invalidated returns `false`.
    pub fn invalidate<T>(&self, proxy: &TxProxy<T>) -> bool {
        proxy.invalidate()
    }
}
