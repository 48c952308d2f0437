//! Test utilities for namelock
//!
//! Helpers for writing lock tests:
//! - [`init_test_logging`] - once-only tracing setup for tests
//! - [`CallLog`] - ordered record of which callbacks ran
//! - [`HeldGuards`] - captures guards from callbacks so the test decides when to release
//! - [`wait_for`] - polls a condition until it holds or a deadline passes
//!
//! # Example
//!
//! ```rust,no_run
//! use namelock::LockRegistry;
//! use namelock::test_utils::{HeldGuards, wait_for};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), namelock::LockError> {
//! let registry = LockRegistry::new()?;
//! let held = HeldGuards::new();
//!
//! registry.lock("jobs", held.capture("first"), None)?;
//! assert!(wait_for(|| held.len() == 1, Duration::from_secs(1)).await);
//! held.release_all();
//! # Ok(())
//! # }
//! ```

use crate::engine::LockGuard;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses the provided level, or `RUST_LOG`
/// when no level is given; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=namelock=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered log of executed callbacks.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` to the log.
    pub fn record(&self, label: impl Into<String>) {
        locked(&self.entries).push(label.into());
    }

    /// A lock callback that records `label` and releases its guard right away.
    pub fn recorder(&self, label: impl Into<String>) -> impl FnOnce(LockGuard) + Send + 'static {
        let log = self.clone();
        let label = label.into();
        move |guard| {
            log.record(label);
            guard.release();
        }
    }

    /// Snapshot of the recorded labels.
    pub fn entries(&self) -> Vec<String> {
        locked(&self.entries).clone()
    }

    /// Number of recorded labels.
    pub fn len(&self) -> usize {
        locked(&self.entries).len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Held {
    labels: Vec<String>,
    guards: VecDeque<LockGuard>,
}

/// Holds guards captured from callbacks until the test releases them.
#[derive(Debug, Clone, Default)]
pub struct HeldGuards {
    inner: Arc<Mutex<Held>>,
}

impl HeldGuards {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A lock callback that records `label` and keeps the guard.
    pub fn capture(&self, label: impl Into<String>) -> impl FnOnce(LockGuard) + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let label = label.into();
        move |guard| {
            let mut held = locked(&inner);
            held.labels.push(label);
            held.guards.push_back(guard);
        }
    }

    /// Labels of every callback that ran so far, in order.
    pub fn labels(&self) -> Vec<String> {
        locked(&self.inner).labels.clone()
    }

    /// Number of callbacks that ran so far.
    pub fn len(&self) -> usize {
        locked(&self.inner).labels.len()
    }

    /// True if no callback ran yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of guards currently held.
    pub fn held_count(&self) -> usize {
        locked(&self.inner).guards.len()
    }

    /// Release the oldest held guard. Returns false if none is held.
    pub fn release_next(&self) -> bool {
        let guard = locked(&self.inner).guards.pop_front();
        guard.map(LockGuard::release).is_some()
    }

    /// Release the oldest held guard and cancel all waiters on its lock.
    pub fn abort_next(&self) -> bool {
        let guard = locked(&self.inner).guards.pop_front();
        guard.map(LockGuard::release_and_abort).is_some()
    }

    /// Release every held guard, oldest first.
    pub fn release_all(&self) {
        while self.release_next() {}
    }
}

/// Poll `condition` every few milliseconds until it holds or `timeout` passes.
///
/// Returns whether the condition was met.
pub async fn wait_for(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
