//! StateContainer Integration Test Suite
//!
//! Exercises the public `trackstate` API end to end: synchronous and
//! asynchronous transactions, observer delivery, FIFO serialization across
//! sync and async callers, and stale-proxy rejection.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test state_container
//!
//! # Run the concurrency tests only
//! cargo test --test state_container concurrency::
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use trackstate::{StateContainer, Untrack};

// Test modules
mod async_ops;
mod basic_ops;
mod stale_proxy;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Value used by most tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub count: i64,
}

impl Counter {
    pub fn new(count: i64) -> Self {
        Self { count }
    }
}

/// Route `tracing` output to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Create a counter container starting at zero
pub fn counter_container() -> StateContainer<Counter> {
    init_tracing();
    StateContainer::builder()
        .name("test-counter")
        .build(Counter::default())
}

/// Register an observer that records every value it sees
pub fn record_values<T>(state: &StateContainer<T>) -> (Arc<Mutex<Vec<T>>>, Untrack)
where
    T: Clone + Send + Sync + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let untrack = {
        let seen = Arc::clone(&seen);
        state.track(move |value: &T| seen.lock().push(value.clone()))
    };
    (seen, untrack)
}
