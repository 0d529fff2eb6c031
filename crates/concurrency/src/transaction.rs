//! Transaction lifecycle guard
//!
//! A [`Transaction`] owns the proxy for one transaction attempt and records
//! its outcome with the [`TransactionManager`]. It must end in exactly one of
//! [`Transaction::commit`] or [`Transaction::abort`]; if it is dropped while
//! still running (the runner panicked, or an async transaction's future was
//! dropped) the drop handler aborts it.
//!
//! In every outcome the proxy is invalidated before the transaction ends.

use crate::manager::TransactionManager;
use crate::proxy::TxProxy;
use trackstate_core::{StaleProxyError, TxnId, Version};

/// Status of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The runner has not finished yet
    Running,
    /// The working copy was resolved and assigned a version
    Committed {
        /// Version assigned to the committed value
        version: Version,
    },
    /// The working copy was discarded
    Aborted {
        /// Human-readable reason
        reason: String,
    },
}

/// One transaction attempt against a container
pub struct Transaction<'m, T> {
    txn_id: TxnId,
    proxy: TxProxy<T>,
    status: TransactionStatus,
    manager: &'m TransactionManager,
}

impl<'m, T> Transaction<'m, T> {
    pub(crate) fn new(manager: &'m TransactionManager, txn_id: TxnId, proxy: TxProxy<T>) -> Self {
        Self {
            txn_id,
            proxy,
            status: TransactionStatus::Running,
            manager,
        }
    }

    /// Transaction identifier
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Current status
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Proxy to hand to the runner
    pub fn proxy(&self) -> &TxProxy<T> {
        &self.proxy
    }

    /// Resolve the working copy and assign it the next version
    ///
    /// The proxy is invalidated whether or not resolution succeeds. The caller
    /// is responsible for installing the returned value as the committed value
    /// while it still holds the gate.
    pub fn commit(mut self) -> Result<(T, Version), StaleProxyError> {
        let factory = self.manager.factory();
        let resolved = factory.resolve(&self.proxy);
        factory.invalidate(&self.proxy);

        match resolved {
            Ok(value) => {
                let version = self.manager.record_commit(self.txn_id);
                self.status = TransactionStatus::Committed { version };
                Ok((value, version))
            }
            Err(e) => {
                self.manager.record_abort(self.txn_id, &e.to_string());
                self.status = TransactionStatus::Aborted {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Discard the working copy
    pub fn abort(mut self, reason: impl Into<String>) {
        self.abort_in_place(reason.into());
    }

    fn abort_in_place(&mut self, reason: String) {
        self.manager.factory().invalidate(&self.proxy);
        self.manager.record_abort(self.txn_id, &reason);
        self.status = TransactionStatus::Aborted { reason };
    }
}

impl<T> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if self.status == TransactionStatus::Running {
            tracing::warn!(
                container = %self.manager.container(),
                txn_id = %self.txn_id,
                "Transaction dropped before completion; aborting"
            );
            self.abort_in_place("dropped before completion".to_string());
        }
    }
}

impl<T> std::fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("txn_id", &self.txn_id)
            .field("status", &self.status)
            .finish()
    }
}
