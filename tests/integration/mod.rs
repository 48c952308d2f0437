//! Integration test suite for namelock
//!
//! End-to-end tests driving the public API the way applications do. These run
//! quickly and are executed in CI on every commit.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **ordering**: arrival-order grants, initial state, bulk flush
//! - **timeouts**: cancellation of queued waiters
//! - **overflow**: bounded queues and eviction strategies
//! - **lock_async**: future-returning entry and release on settlement
//! - **config_file**: registry configuration files
//! - **cli**: the `namelock` binary

mod cli;
mod config_file;
mod lock_async;
mod ordering;

use std::time::Duration;

/// Upper bound for any single wait in these tests.
pub const WAIT: Duration = Duration::from_secs(3);
