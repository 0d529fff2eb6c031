//! Error taxonomy for transactions and observers
//!
//! ## Error Types
//!
//! | Type | Raised when | Recoverable |
//! |------|-------------|-------------|
//! | [`TransactionError::Aborted`] | the runner returned `Err` | caller decides (no automatic retry) |
//! | [`StaleProxyError`] | a proxy is used after its transaction ended | no, programming error |
//! | [`TransactionError::Reentrant`] | a transaction is requested from inside a runner/observer of the same container | no, programming error |
//! | [`TransactionError::WouldBlock`] | a contended synchronous transaction is requested on a current-thread runtime | yes, use the async entry point |
//! | [`ObserverError`] | an observer panicked during notification | reported to a hook, never propagated |
//!
//! A failed transaction always leaves the container's value exactly as it was
//! before the transaction started.

use crate::types::{ContainerId, ObserverId, TxnId, Version};
use thiserror::Error;

/// A transaction proxy was used after its transaction ended
///
/// Raised by every read or write through a proxy once the owning transaction
/// committed or aborted. Signals that the runner retained the proxy past its
/// valid lifetime; retrying cannot succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("proxy of {txn_id} used after the transaction ended")]
pub struct StaleProxyError {
    /// Transaction that owned the proxy
    pub txn_id: TxnId,
}

impl StaleProxyError {
    /// Create a stale-proxy error for the given transaction
    pub fn new(txn_id: TxnId) -> Self {
        Self { txn_id }
    }
}

/// Failure of a `transact` / `transact_async` call
///
/// `E` is the runner's own error type. It is carried unchanged in
/// [`TransactionError::Aborted`] so the caller can inspect or re-raise it.
#[derive(Debug, Error)]
pub enum TransactionError<E> {
    /// The runner returned an error; the value was left unchanged
    #[error("{txn_id} aborted: {cause}")]
    Aborted {
        /// Transaction that aborted
        txn_id: TxnId,
        /// The runner's error, unchanged
        cause: E,
    },

    /// The transaction's proxy could not be resolved at commit time
    #[error(transparent)]
    StaleProxy(#[from] StaleProxyError),

    /// A transaction was requested from inside a runner or observer of the
    /// same container on the same thread
    #[error("re-entrant transaction on {container}")]
    Reentrant {
        /// Container that rejected the request
        container: ContainerId,
    },

    /// A synchronous transaction found the gate held while running on a
    /// current-thread runtime, which the holder may need to make progress
    #[error("transaction gate of {container} is held and the caller cannot block")]
    WouldBlock {
        /// Container whose gate was contended
        container: ContainerId,
    },
}

impl<E> TransactionError<E> {
    /// Check if the runner itself failed.
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransactionError::Aborted { .. })
    }

    /// Check if this is a stale-proxy error.
    pub fn is_stale_proxy(&self) -> bool {
        matches!(self, TransactionError::StaleProxy(_))
    }

    /// Check if the request was rejected as re-entrant.
    pub fn is_reentrant(&self) -> bool {
        matches!(self, TransactionError::Reentrant { .. })
    }

    /// Check if a synchronous request could not wait for the gate.
    pub fn is_would_block(&self) -> bool {
        matches!(self, TransactionError::WouldBlock { .. })
    }

    /// The runner's error, if the runner failed
    pub fn cause(&self) -> Option<&E> {
        match self {
            TransactionError::Aborted { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Consume the error, returning the runner's error if the runner failed
    pub fn into_cause(self) -> Option<E> {
        match self {
            TransactionError::Aborted { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Transaction the error belongs to, if one was started
    pub fn txn_id(&self) -> Option<TxnId> {
        match self {
            TransactionError::Aborted { txn_id, .. } => Some(*txn_id),
            TransactionError::StaleProxy(e) => Some(e.txn_id),
            TransactionError::Reentrant { .. } | TransactionError::WouldBlock { .. } => None,
        }
    }

    /// Map the runner's error, leaving the other variants untouched
    pub fn map_cause<F>(self, f: impl FnOnce(E) -> F) -> TransactionError<F> {
        match self {
            TransactionError::Aborted { txn_id, cause } => TransactionError::Aborted {
                txn_id,
                cause: f(cause),
            },
            TransactionError::StaleProxy(e) => TransactionError::StaleProxy(e),
            TransactionError::Reentrant { container } => TransactionError::Reentrant { container },
            TransactionError::WouldBlock { container } => {
                TransactionError::WouldBlock { container }
            }
        }
    }
}

/// An observer panicked while being notified of a commit
///
/// Observer failures are isolated: delivery continues with the remaining
/// observers and the commit stands. The error is reported to the tracker's
/// error hook instead of the transaction caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{observer} failed while handling {version}: {message}")]
pub struct ObserverError {
    /// Registration that failed
    pub observer: ObserverId,
    /// Version that was being delivered
    pub version: Version,
    /// Panic payload rendered as text
    pub message: String,
}

impl ObserverError {
    /// Build an observer error from a panic payload
    pub fn from_panic(
        observer: ObserverId,
        version: Version,
        payload: &(dyn std::any::Any + Send),
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "observer panicked".to_string()
        };
        Self {
            observer,
            version,
            message,
        }
    }
}
