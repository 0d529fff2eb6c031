//! Change tracking for trackstate
//!
//! This crate implements the observer side of a trackable state:
//! - [`ChangeTracker`]: ordered observer registry with isolated delivery
//! - [`Untrack`]: idempotent deregistration handle
//! - [`TrackGuard`]: RAII variant of [`Untrack`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod tracker;

pub use tracker::{
    log_observer_error, ChangeTracker, NotifyReport, ObserverErrorHook, TrackGuard, Untrack,
};
