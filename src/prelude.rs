//! Convenient imports for trackstate.
//!
//! ```ignore
//! use trackstate::prelude::*;
//!
//! let state = StateContainer::new(0u32);
//! state.transact(|p| p.set(1))?;
//! ```

// Main entry point
pub use crate::{StateContainer, StateContainerBuilder};

// Error handling
pub use crate::error::{Error, Result};
pub use crate::{StaleProxyError, TransactionError};

// Observation and transactions
pub use crate::{TrackGuard, Trackable, TrackableState, TransactionTarget, TxProxy, Untrack};

// Core types
pub use crate::Version;
