//! Concurrency layer for trackstate
//!
//! This crate implements transactional isolation for a single value:
//! - [`TxProxy`] / [`ProxyFactory`]: working-copy proxies with read-your-writes
//! - [`Transaction`]: lifecycle guard that always invalidates its proxy
//! - [`TransactionManager`]: txn id / version allocation and counters
//! - [`TransactionGate`]: FIFO serialization, usable from sync and async code
//! - [`scope`]: re-entrancy detection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod factory;
pub mod gate;
pub mod manager;
pub mod proxy;
pub mod scope;
pub mod transaction;

pub use factory::ProxyFactory;
pub use gate::{GatePermit, TransactionGate};
pub use manager::{TransactionManager, TransactionMetrics};
pub use proxy::TxProxy;
pub use scope::Scoped;
pub use transaction::{Transaction, TransactionStatus};
