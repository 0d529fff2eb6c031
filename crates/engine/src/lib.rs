//! State container engine for trackstate
//!
//! This crate composes the tracker and concurrency layers into
//! [`StateContainer`], the single owner of a transactional, observable value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod container;
pub mod metrics;

pub use builder::{ContainerConfig, StateContainerBuilder};
pub use container::StateContainer;
pub use metrics::ContainerMetrics;
