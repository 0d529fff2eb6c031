//! Capability traits of a trackable state
//!
//! A trackable state exposes exactly two capabilities:
//! - [`Trackable`]: subscribe to committed changes
//! - [`TransactionTarget`]: mutate the value through atomic transactions
//!
//! [`TrackableState`] is the combination of both and is implemented for every
//! type that implements the two.

use crate::error::TransactionError;
use std::future::Future;

/// Subscribe-to-change capability
pub trait Trackable<T> {
    /// Handle returned by [`Trackable::track`] that deregisters the callback
    type Untrack;

    /// Register `callback` to be invoked with every future committed value.
    ///
    /// Registering the same callback twice registers it twice.
    fn track<F>(&self, callback: F) -> Self::Untrack
    where
        F: Fn(&T) + Send + Sync + 'static;
}

/// Run-a-transaction capability
///
/// Both entry points run the runner against a transaction-scoped proxy, never
/// against the committed value itself. On success the proxy's working copy
/// becomes the new value and observers are notified before the call returns;
/// on failure the value is left untouched and nobody is notified.
pub trait TransactionTarget<T> {
    /// Transaction-scoped view handed to runners
    type Proxy;

    /// Run a synchronous transaction.
    fn transact<R, E, F>(&self, runner: F) -> Result<R, TransactionError<E>>
    where
        F: FnOnce(Self::Proxy) -> Result<R, E>;

    /// Run an asynchronous transaction.
    ///
    /// The returned future settles only after the runner's own future has
    /// settled and the outcome has been committed or discarded.
    fn transact_async<R, E, F, Fut>(
        &self,
        runner: F,
    ) -> impl Future<Output = Result<R, TransactionError<E>>> + Send
    where
        F: FnOnce(Self::Proxy) -> Fut + Send,
        Fut: Future<Output = Result<R, E>> + Send,
        R: Send,
        E: Send;
}

/// A state that can be both tracked and transacted upon
pub trait TrackableState<T>: Trackable<T> + TransactionTarget<T> {}

impl<T, S> TrackableState<T> for S where S: Trackable<T> + TransactionTarget<T> {}
