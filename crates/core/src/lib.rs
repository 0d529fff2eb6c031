//! Core types for trackstate
//!
//! This crate defines the vocabulary shared by every other crate:
//! - Identifiers: [`ContainerId`], [`TxnId`], [`ObserverId`], [`Version`]
//! - Errors: [`TransactionError`], [`StaleProxyError`], [`ObserverError`]
//! - Capability traits: [`Trackable`], [`TransactionTarget`], [`TrackableState`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ObserverError, StaleProxyError, TransactionError};
pub use traits::{Trackable, TrackableState, TransactionTarget};
pub use types::{ContainerId, ObserverId, TxnId, Version};
