//! Global constants used throughout the namelock codebase.
//!
//! Timeouts, environment variable names and other values that are shared
//! across modules live here so magic numbers stay discoverable.

use std::time::Duration;

/// Environment variable that overrides the location of the configuration file.
pub const CONFIG_PATH_ENV: &str = "NAMELOCK_CONFIG_PATH";

/// Directory (relative to the home directory) holding the configuration file.
pub const CONFIG_DIR_NAME: &str = ".namelock";

/// File name of the registry configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Keyword accepted in configuration files for an unbounded waiter queue.
pub const UNBOUNDED_KEYWORD: &str = "unbounded";

/// Upper bound for how long `namelock simulate` waits for all workers to settle.
///
/// The effective deadline is the larger of this value and the time the
/// simulated workload needs when every worker runs back to back.
pub const SIMULATION_DEADLINE: Duration = Duration::from_secs(30);
