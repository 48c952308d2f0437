//! Lock options and registry configuration.
//!
//! - [`LockOptions`] / [`LockOptionsPatch`] - per-lock queue bound and overflow strategy
//! - [`RegistryConfig`] - TOML file with defaults and per-name presets

pub mod file;
pub mod options;

pub use file::RegistryConfig;
pub use options::{LockOptions, LockOptionsPatch, OverflowStrategy, QueueLimit};
