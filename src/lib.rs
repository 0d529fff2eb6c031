//! # trackstate
//!
//! A transactional, observable state container.
//!
//! A [`StateContainer`] owns a single value. Observers registered with
//! [`StateContainer::track`] are called after every commit; the value is only
//! ever changed through transactions that run against a [`TxProxy`] working
//! copy and either commit in full or leave the value untouched.
//!
//! ## Quick Start
//!
//! ```ignore
//! use trackstate::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct Counter { count: i64 }
//!
//! let state = StateContainer::new(Counter::default());
//! let guard = state.track(|c| println!("count = {}", c.count)).into_guard();
//!
//! // Synchronous transaction
//! state.transact(|p| p.write(|c| c.count += 1))?;
//!
//! // Asynchronous transaction
//! state
//!     .transact_async(|p| async move {
//!         let delta = fetch_delta().await?;
//!         p.write(|c| c.count += delta)?;
//!         Ok::<_, Error>(())
//!     })
//!     .await?;
//!
//! drop(guard); // stop observing
//! ```
//!
//! ## Crates
//!
//! - `trackstate-core` - identifiers, errors and traits
//! - `trackstate-tracker` - [`ChangeTracker`] observer registry
//! - `trackstate-concurrency` - proxies, transaction guard, FIFO gate
//! - `trackstate-engine` - [`StateContainer`] and its builder

#![warn(missing_docs)]

mod error;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use trackstate_engine::{
    ContainerConfig, ContainerMetrics, StateContainer, StateContainerBuilder,
};

// Re-export building blocks
pub use trackstate_concurrency::{ProxyFactory, TxProxy};
pub use trackstate_core::{
    ContainerId, ObserverError, ObserverId, StaleProxyError, Trackable, TrackableState,
    TransactionError, TransactionTarget, TxnId, Version,
};
pub use trackstate_tracker::{
    log_observer_error, ChangeTracker, NotifyReport, ObserverErrorHook, TrackGuard, Untrack,
};
