//! Core types shared by the engine, registry and CLI.
//!
//! - [`LockError`] - strongly-typed errors returned by the locking API
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - converts any error into an [`ErrorContext`]

pub mod error;
pub mod error_formatting;

pub use error::{ErrorContext, LockError};
pub use error_formatting::{create_error_context, user_friendly_error};
