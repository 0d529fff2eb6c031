//! Change tracker: observer registry and notification fan-out
//!
//! ## Design
//!
//! Each registration is an entry with an explicit active flag. Untracking
//! flips the flag; inactive entries are pruned lazily (at the start of the
//! next `notify` and on every `register`). This keeps deregistration O(1)
//! and makes it safe to call from inside an observer.
//!
//! ## Delivery Rules
//!
//! 1. Observers are notified in registration order.
//! 2. The active set is snapshotted when `notify` starts. An observer untracked
//!    during delivery still receives the in-flight value; an observer
//!    registered during delivery does not.
//! 3. Delivery is synchronous on the caller's thread.
//! 4. A panicking observer is isolated: the panic is caught, reported to the
//!    error hook as an [`ObserverError`], and delivery continues.

use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use trackstate_core::{ObserverError, ObserverId, Version};

/// Callback invoked with every observer failure
pub type ObserverErrorHook = Arc<dyn Fn(&ObserverError) + Send + Sync>;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Hook used when none is configured: logs the failure.
pub fn log_observer_error(err: &ObserverError) {
    tracing::error!(
        observer = %err.observer,
        version = %err.version,
        message = %err.message,
        "Observer panicked during notification"
    );
}

struct Registration<T> {
    id: ObserverId,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

impl<T> Registration<T> {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Outcome of one notification round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Observers that returned normally
    pub delivered: usize,
    /// Observers that panicked
    pub failed: usize,
}

/// Observer registry for a single value of type `T`
///
/// The tracker has no knowledge of transactions; it only fans out values it
/// is handed via [`ChangeTracker::notify`].
pub struct ChangeTracker<T> {
    registrations: Mutex<Vec<Registration<T>>>,
    next_observer_id: AtomicU64,
    failures: AtomicU64,
    error_hook: ObserverErrorHook,
}

impl<T> ChangeTracker<T> {
    /// Create a tracker that logs observer failures
    pub fn new() -> Self {
        Self::with_error_hook(Arc::new(log_observer_error))
    }

    /// Create a tracker that reports observer failures to `hook`
    pub fn with_error_hook(hook: ObserverErrorHook) -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            next_observer_id: AtomicU64::new(1),
            failures: AtomicU64::new(0),
            error_hook: hook,
        }
    }

    /// Register a callback
    ///
    /// The callback is invoked with each value passed to [`notify`](Self::notify)
    /// until the returned [`Untrack`] handle is used. No de-duplication is
    /// performed.
    pub fn register<F>(&self, callback: F) -> Untrack
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ObserverId::from(self.next_observer_id.fetch_add(1, Ordering::Relaxed));
        let active = Arc::new(AtomicBool::new(true));

        let mut registrations = self.registrations.lock();
        registrations.retain(Registration::is_active);
        registrations.push(Registration {
            id,
            active: Arc::clone(&active),
            callback: Arc::new(callback),
        });
        drop(registrations);

        tracing::trace!(observer = %id, "Observer registered");
        Untrack { id, active }
    }

    /// Deliver `value` to every active observer
    ///
    /// See the module docs for the delivery rules.
    pub fn notify(&self, version: Version, value: &T) -> NotifyReport {
        let snapshot: Vec<(ObserverId, Callback<T>)> = {
            let mut registrations = self.registrations.lock();
            registrations.retain(Registration::is_active);
            registrations
                .iter()
                .map(|r| (r.id, Arc::clone(&r.callback)))
                .collect()
        };

        let mut report = NotifyReport::default();
        for (id, callback) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    let err = ObserverError::from_panic(id, version, payload.as_ref());
                    (self.error_hook)(&err);
                }
            }
        }
        report
    }

    /// Number of active registrations
    pub fn observer_count(&self) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.is_active())
            .count()
    }

    /// Total observer failures since creation
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ChangeTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("observers", &self.observer_count())
            .field("failures", &self.failure_count())
            .finish()
    }
}

/// Handle that deregisters an observer
///
/// Untracking is idempotent: only the first call has an effect and no call
/// ever fails. Clones share the same registration.
#[derive(Debug, Clone)]
#[must_use = "dropping an Untrack handle leaves the observer registered forever"]
pub struct Untrack {
    id: ObserverId,
    active: Arc<AtomicBool>,
}

impl Untrack {
    /// Deregister the observer
    ///
    /// Returns `true` only for the call that actually deactivated it.
    pub fn untrack(&self) -> bool {
        let was_active = self.active.swap(false, Ordering::AcqRel);
        if was_active {
            tracing::trace!(observer = %self.id, "Observer untracked");
        }
        was_active
    }

    /// Check whether the observer is still registered
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Registration this handle controls
    pub fn observer_id(&self) -> ObserverId {
        self.id
    }

    /// Convert into a guard that untracks when dropped
    pub fn into_guard(self) -> TrackGuard {
        TrackGuard {
            untrack: self,
            armed: true,
        }
    }
}

/// RAII guard for an observer registration
///
/// Dropping the guard untracks the observer.
#[derive(Debug)]
#[must_use = "dropping a TrackGuard untracks the observer immediately"]
pub struct TrackGuard {
    untrack: Untrack,
    armed: bool,
}

impl TrackGuard {
    /// Registration this guard controls
    pub fn observer_id(&self) -> ObserverId {
        self.untrack.observer_id()
    }

    /// Give up the guard without untracking
    pub fn into_untrack(mut self) -> Untrack {
        self.armed = false;
        self.untrack.clone()
    }
}

impl Drop for TrackGuard {
    fn drop(&mut self) {
        if self.armed {
            self.untrack.untrack();
        }
    }
}
