//! Core identifier types
//!
//! This module defines the identifiers used throughout the system:
//! - [`ContainerId`]: Identity of a state container (used for re-entrancy checks)
//! - [`TxnId`]: Identity of a single transaction attempt
//! - [`ObserverId`]: Identity of an observer registration
//! - [`Version`]: Commit counter of a container's value

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a state container
///
/// Allocated from a process-wide counter, so two containers never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Allocate a fresh container id
    ///
    /// # Examples
    ///
    /// ```
    /// use trackstate_core::ContainerId;
    ///
    /// let a = ContainerId::next();
    /// let b = ContainerId::next();
    /// assert_ne!(a, b);
    /// ```
    pub fn next() -> Self {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// Transaction identifier
///
/// Allocated once per transaction attempt, whether it commits or aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TxnId {
    fn from(raw: u64) -> Self {
        TxnId(raw)
    }
}

impl std::fmt::Display for TxnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn#{}", self.0)
    }
}

/// Observer registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ObserverId {
    fn from(raw: u64) -> Self {
        ObserverId(raw)
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// Commit version of a container's value
///
/// The initial value is version 0. Every commit increments the version by
/// exactly one; aborted transactions never consume a version.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly constructed container
    pub const INITIAL: Version = Version(0);

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The version that follows this one
    ///
    /// # Examples
    ///
    /// ```
    /// use trackstate_core::Version;
    ///
    /// assert_eq!(Version::INITIAL.next().as_u64(), 1);
    /// ```
    pub fn next(&self) -> Version {
        Version(self.0 + 1)
    }
}

impl From<u64> for Version {
    fn from(raw: u64) -> Self {
        Version(raw)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}
