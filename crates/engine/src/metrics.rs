//! Container metrics

use serde::Serialize;
use trackstate_core::Version;

/// Container metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerMetrics {
    /// Version of the committed value
    pub version: Version,
    /// Total committed transactions
    pub transactions_committed: u64,
    /// Total aborted transactions
    pub transactions_aborted: u64,
    /// Total observer panics caught during notification
    pub observer_failures: u64,
    /// Currently active observers
    pub observers: usize,
    /// Commit success rate (0.0 - 1.0)
    pub commit_rate: f64,
}
