//! Re-entrancy detection
//!
//! A thread-local stack records which containers are currently executing a
//! runner or notifying observers on this thread. A transaction requested on
//! a container that is already on the stack would wait for a gate held by
//! its own caller, so it is rejected instead.
//!
//! Async runners are wrapped in [`Scoped`], which enters the scope around
//! every poll; the scope is never held across a suspension point.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use trackstate_core::ContainerId;

thread_local! {
    /// Containers currently running code on this thread, innermost last
    static ACTIVE: RefCell<Vec<ContainerId>> = const { RefCell::new(Vec::new()) };
}

/// Check whether `container` is running a runner or observer on this thread
pub fn is_active(container: ContainerId) -> bool {
    ACTIVE.with(|active| active.borrow().contains(&container))
}

/// Mark `container` active on this thread until the guard is dropped
pub fn enter(container: ContainerId) -> ScopeGuard {
    ACTIVE.with(|active| active.borrow_mut().push(container));
    ScopeGuard {
        container,
        _not_send: PhantomData,
    }
}

/// RAII guard returned by [`enter`]
#[must_use]
pub struct ScopeGuard {
    container: ContainerId,
    /// Thread-local state: the guard must be dropped on the thread that made it
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|c| *c == self.container) {
                active.remove(pos);
            }
        });
    }
}

/// Future wrapper that enters a container's scope around every poll
pub struct Scoped<F> {
    container: ContainerId,
    inner: Pin<Box<F>>,
}

impl<F: Future> Scoped<F> {
    /// Wrap `inner` so that it runs inside `container`'s scope
    pub fn new(container: ContainerId, inner: F) -> Self {
        Self {
            container,
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let _scope = enter(this.container);
        this.inner.as_mut().poll(cx)
    }
}
