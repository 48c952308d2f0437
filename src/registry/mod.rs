//! Named lock registry.
//!
//! [`LockRegistry`] maps lock names to [`LockEngine`]s. Engines are created
//! lazily on first use (`lock`, `lock_async` or `set_options`) and live until
//! the registry is [`reset`](LockRegistry::reset) or dropped. Each registry is
//! an independent object; there is no process-wide singleton, so tests and
//! subsystems can hold their own instances.
//!
//! # Examples
//!
//! ```rust,no_run
//! use namelock::{LockError, LockRegistry};
//!
//! # async fn example() -> Result<(), LockError> {
//! let registry = LockRegistry::new()?;
//!
//! // Callback style: the guard releases the lock
//! registry.lock("reports", |guard| {
//!     tokio::spawn(async move {
//!         // ... critical section ...
//!         guard.release();
//!     });
//! }, None)?;
//!
//! // Future style: released automatically when the work settles
//! let total = registry
//!     .lock_async("reports", || async { Ok::<_, LockError>(42) })
//!     .await?;
//! assert_eq!(total, 42);
//! # Ok(())
//! # }
//! ```
//!
//! Each name is an independent unit. Nesting locks on two different names from
//! two call sites in opposite orders can deadlock, and so does nesting the same
//! name inside its own critical section.
//!
//! A same-name deadlock also leaks the engine when the queued callback keeps
//! the holder's [`LockGuard`]: the engine owns the queue, the queue owns the
//! callback, and the guard owns an `Arc` of the engine. Neither
//! [`reset`](LockRegistry::reset) nor dropping the registry frees it. Only a
//! [`release_queue`](LockRegistry::release_queue) on that name, which runs the
//! callback and drops the guard, breaks the cycle.

mod promise;

use crate::config::{LockOptions, LockOptionsPatch, RegistryConfig};
use crate::core::LockError;
use crate::engine::{LockEngine, LockGuard, Ticket};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Registry of named locks.
#[derive(Debug)]
pub struct LockRegistry {
    engines: DashMap<String, Arc<LockEngine>>,
    config: RegistryConfig,
    runtime: Handle,
}

impl LockRegistry {
    /// Create a registry bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// [`LockError::RuntimeUnavailable`] when called outside a runtime.
    pub fn new() -> Result<Self, LockError> {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry bound to the current runtime, using `config` for
    /// default and per-name options.
    pub fn with_config(config: RegistryConfig) -> Result<Self, LockError> {
        let runtime = Handle::try_current().map_err(|e| LockError::RuntimeUnavailable {
            reason: e.to_string(),
        })?;
        Ok(Self::with_handle(runtime, config))
    }

    /// Create a registry that schedules callbacks on `runtime`.
    pub fn with_handle(runtime: Handle, config: RegistryConfig) -> Self {
        Self {
            engines: DashMap::new(),
            config,
            runtime,
        }
    }

    /// The configuration new engines are created from.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Enter the critical section `name`.
    ///
    /// `callback` runs once the lock is granted and receives the [`LockGuard`]
    /// that releases it. With a non-zero `timeout`, a waiter still queued when
    /// the timeout fires is dropped without running.
    ///
    /// # Errors
    ///
    /// [`LockError::InvalidArgument`] if `name` is empty. Nothing is queued then.
    pub fn lock<F>(
        &self,
        name: &str,
        callback: F,
        timeout: Option<Duration>,
    ) -> Result<Ticket, LockError>
    where
        F: FnOnce(LockGuard) + Send + 'static,
    {
        validate_name(name)?;
        Ok(self.engine(name).enter(callback, timeout))
    }

    /// Bulk flush: run every callback queued on `name` right now, in FIFO order.
    ///
    /// Bypasses one-at-a-time ownership and leaves the current owner in place.
    /// Returns the number of callbacks invoked (0 when no lock `name` exists).
    pub fn release_queue(&self, name: &str) -> Result<usize, LockError> {
        validate_name(name)?;
        Ok(self.existing(name).map_or(0, |engine| engine.flush()))
    }

    /// Whether a lock called `name` has been created.
    pub fn lock_exists(&self, name: &str) -> Result<bool, LockError> {
        validate_name(name)?;
        Ok(self.engines.contains_key(name))
    }

    /// Whether `name` is currently held; `None` if no such lock exists.
    pub fn is_locked(&self, name: &str) -> Result<Option<bool>, LockError> {
        validate_name(name)?;
        Ok(self.existing(name).map(|engine| engine.is_locked()))
    }

    /// Number of waiters queued on `name`; `None` if no such lock exists.
    pub fn queue_size(&self, name: &str) -> Result<Option<usize>, LockError> {
        validate_name(name)?;
        Ok(self.existing(name).map(|engine| engine.queue_size()))
    }

    /// Copy of the options of `name`; `None` if no such lock exists.
    pub fn options(&self, name: &str) -> Result<Option<LockOptions>, LockError> {
        validate_name(name)?;
        Ok(self.existing(name).map(|engine| engine.options()))
    }

    /// Merge `patch` over the options of `name`, creating the lock if needed.
    ///
    /// Returns the resulting options.
    pub fn set_options(
        &self,
        name: &str,
        patch: LockOptionsPatch,
    ) -> Result<LockOptions, LockError> {
        validate_name(name)?;
        let options = self.engine(name).update_options(&patch);
        tracing::debug!(
            "Lock '{}' options: max_queue_size={}, overflow_strategy={}",
            name,
            options.max_queue_size,
            options.overflow_strategy
        );
        Ok(options)
    }

    /// Names of all created locks, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Forget every lock. Intended for test isolation.
    ///
    /// Engines still referenced by guards or tickets keep working, but are no
    /// longer reachable by name. Configuration presets are kept.
    pub fn reset(&self) {
        let count = self.engines.len();
        self.engines.clear();
        tracing::info!("Lock registry reset ({} locks dropped)", count);
    }

    /// Get or lazily create the engine for `name`.
    fn engine(&self, name: &str) -> Arc<LockEngine> {
        if let Some(engine) = self.existing(name) {
            return engine;
        }
        self.engines
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating lock '{}'", name);
                LockEngine::new(name, self.config.options_for(name), self.runtime.clone())
            })
            .clone()
    }

    /// The engine for `name`, if created. The map reference is dropped before
    /// returning so callers may re-enter the registry.
    fn existing(&self, name: &str) -> Option<Arc<LockEngine>> {
        self.engines.get(name).map(|entry| Arc::clone(entry.value()))
    }
}

/// Lock names must be non-empty.
pub(crate) fn validate_name(name: &str) -> Result<(), LockError> {
    if name.is_empty() {
        return Err(LockError::invalid_argument("name", "lock name must not be empty"));
    }
    Ok(())
}
