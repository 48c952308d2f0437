//! namelock - named async critical sections
//!
//! Callers enter a mutually exclusive critical section identified by a string
//! name. Contenders queue in arrival order and are released one at a time as
//! the current holder signals completion.
//!
//! # Architecture Overview
//!
//! Two tiers, leaves first:
//!
//! - [`engine`] - one [`LockEngine`] per name: FIFO waiter queue, current owner,
//!   timeout cancellation of queued waiters and bounded-queue eviction
//! - [`registry`] - [`LockRegistry`] maps names to engines, creates them lazily,
//!   applies per-name options and offers a future-returning entry point
//!
//! Supporting modules:
//! - [`config`] - [`LockOptions`] and the TOML [`RegistryConfig`] file
//! - [`core`](crate::core) - [`LockError`] and user-facing error formatting
//! - [`cli`] - the `namelock` command-line tool
//!
//! # Ownership Model
//!
//! Every granted callback receives a [`LockGuard`]. Releasing (or dropping) the
//! guard hands the lock to the oldest live waiter. Callers get a [`Ticket`] back
//! from every entry, which can observe or cancel a queued claim but never
//! release the lock.
//!
//! Callbacks always run as tokio tasks scheduled after the grant, never inline
//! with the call that granted ownership.
//!
//! # Queue Policies
//!
//! - **Timeouts** cancel waiters that are still queued when they fire. The
//!   running owner is never preempted.
//! - **Overflow** evicts waiters once a lock's queue exceeds `max_queue_size`,
//!   picking them by [`OverflowStrategy`] (`this`, `first` or `last`).
//!
//! Both policies are silent: the dropped callback simply never runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use namelock::{LockError, LockOptionsPatch, LockRegistry, OverflowStrategy, QueueLimit};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), LockError> {
//! let registry = LockRegistry::new()?;
//! registry.set_options(
//!     "uploads",
//!     LockOptionsPatch::new()
//!         .max_queue_size(QueueLimit::bounded(4)?)
//!         .overflow_strategy(OverflowStrategy::First),
//! )?;
//!
//! // Give up if the lock is not granted within a second
//! registry.lock("uploads", |guard| {
//!     tokio::spawn(async move {
//!         // ... exclusive work ...
//!         guard.release();
//!     });
//! }, Some(Duration::from_secs(1)))?;
//!
//! let bytes = registry
//!     .lock_async("uploads", || async { Ok::<_, LockError>(1024) })
//!     .await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;
pub mod registry;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{LockOptions, LockOptionsPatch, OverflowStrategy, QueueLimit, RegistryConfig};
pub use crate::core::LockError;
pub use engine::{LockEngine, LockGuard, Ticket, TicketState, TokenId};
pub use registry::LockRegistry;
