//! Container configuration
//!
//! [`ContainerConfig`] holds the plain, serializable settings so a host
//! application can embed them in its own config file. [`StateContainerBuilder`]
//! adds the non-serializable parts (the observer error hook) and builds the
//! container.

use crate::container::StateContainer;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use trackstate_core::ObserverError;
use trackstate_tracker::ObserverErrorHook;

/// Serializable container settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Label used in logs; defaults to the container id
    pub name: Option<String>,

    /// Emit debug events for transaction begin/commit
    ///
    /// Aborts and observer failures are logged regardless.
    pub trace_transactions: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: None,
            trace_transactions: true,
        }
    }
}

/// Builder for container configuration.
///
/// The builder is typed by the value it will hold; `StateContainer::builder()`
/// infers `T` from the argument to [`build`](Self::build).
///
/// # Example
///
/// ```ignore
/// let state = StateContainer::builder()
///     .name("session")
///     .trace_transactions(false)
///     .on_observer_error(|err| eprintln!("{}", err))
///     .build(Session::default());
/// ```
pub struct StateContainerBuilder<T> {
    config: ContainerConfig,
    observer_error_hook: Option<ObserverErrorHook>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Default for StateContainerBuilder<T> {
    fn default() -> Self {
        Self {
            config: ContainerConfig::default(),
            observer_error_hook: None,
            _value: PhantomData,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> StateContainerBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Enable or disable debug events for transaction begin/commit.
    pub fn trace_transactions(mut self, enabled: bool) -> Self {
        self.config.trace_transactions = enabled;
        self
    }

    /// Replace all serializable settings at once.
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Report observer failures to `hook` instead of logging them.
    pub fn on_observer_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObserverError) + Send + Sync + 'static,
    {
        self.observer_error_hook = Some(Arc::new(hook));
        self
    }

    /// Build a container holding `initial`.
    pub fn build(self, initial: T) -> StateContainer<T> {
        StateContainer::from_config(self.config, self.observer_error_hook, initial)
    }
}

impl<T> std::fmt::Debug for StateContainerBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainerBuilder")
            .field("config", &self.config)
            .field("observer_error_hook", &self.observer_error_hook.is_some())
            .finish()
    }
}
