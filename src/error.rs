//! Unified error type for trackstate.
//!
//! The component crates report failures with precise, generic types
//! ([`TransactionError<E>`] carries the runner's own error). Applications that
//! juggle several containers with different runner errors can flatten them
//! into this single [`Error`].

use thiserror::Error;
use trackstate_core::{ObserverError, StaleProxyError, TransactionError};

/// All trackstate errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A proxy was used after its transaction ended
    #[error(transparent)]
    StaleProxy(#[from] StaleProxyError),

    /// The runner failed; the committed value is unchanged
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// A transaction was requested from inside a runner or observer of the
    /// same container
    #[error("re-entrant transaction on {0}")]
    Reentrant(String),

    /// A contended synchronous transaction was requested on a current-thread
    /// runtime
    #[error("transaction on {0} would block a current-thread runtime")]
    WouldBlock(String),

    /// An observer panicked during notification
    #[error(transparent)]
    Observer(#[from] ObserverError),
}

/// Result type for trackstate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// `WouldBlock` may succeed once the gate is free or when retried through
    /// the async entry point.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::WouldBlock(_))
    }

    /// Check if this is a stale-proxy error.
    pub fn is_stale_proxy(&self) -> bool {
        matches!(self, Error::StaleProxy(_))
    }

    /// Check if the transaction was aborted by its runner.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted(_))
    }
}

// Convert from the container's transaction errors
impl<E: std::fmt::Display> From<TransactionError<E>> for Error {
    fn from(e: TransactionError<E>) -> Self {
        match e {
            TransactionError::Aborted { txn_id, cause } => {
                Error::Aborted(format!("{}: {}", txn_id, cause))
            }
            TransactionError::StaleProxy(stale) => Error::StaleProxy(stale),
            TransactionError::Reentrant { container } => Error::Reentrant(container.to_string()),
            TransactionError::WouldBlock { container } => Error::WouldBlock(container.to_string()),
        }
    }
}
