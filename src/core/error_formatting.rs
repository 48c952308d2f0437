//! Error formatting utilities for namelock
//!
//! Converts internal errors into clear, actionable messages for CLI users.

use super::error::{ErrorContext, LockError};
use crate::constants::CONFIG_PATH_ENV;

/// Keywords that indicate TOML parsing problems
const PARSE_ERROR_KEYWORDS: &[&str] = &["toml", "parse", "expected", "unknown variant"];

/// Keywords that indicate permission-related errors
const PERMISSION_ERROR_KEYWORDS: &[&str] = &["permission", "denied", "access"];

/// Convert any error into a user-friendly format with contextual suggestions
///
/// Walks the error chain looking for a [`LockError`] first; I/O errors and
/// configuration parse failures get generic but useful suggestions.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(lock_error) = cause.downcast_ref::<LockError>() {
            return create_error_context(lock_error);
        }

        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            match io_error.kind() {
                std::io::ErrorKind::NotFound => {
                    return ErrorContext::new(LockError::ConfigError {
                        message: error.to_string(),
                    })
                    .with_suggestion("Check that the file exists, or run 'namelock config init'")
                    .with_details(format!(
                        "The configuration path can be overridden with {CONFIG_PATH_ENV}"
                    ));
                }
                std::io::ErrorKind::PermissionDenied => {
                    return ErrorContext::new(LockError::ConfigError {
                        message: error.to_string(),
                    })
                    .with_suggestion("Check the file ownership and permissions");
                }
                _ => {}
            }
        }
    }

    let message = format!("{error:#}");
    let lower = message.to_lowercase();

    let context = ErrorContext::new(LockError::ConfigError {
        message: message.clone(),
    });

    if PARSE_ERROR_KEYWORDS.iter().any(|k| lower.contains(k)) {
        context
            .with_suggestion(
                "Fix the configuration file syntax; see 'namelock config init' for an example",
            )
            .with_details(concat!(
                "max_queue_size must be a positive integer or \"unbounded\"; ",
                "overflow_strategy must be this, first or last"
            ))
    } else if PERMISSION_ERROR_KEYWORDS.iter().any(|k| lower.contains(k)) {
        context.with_suggestion("Check the file ownership and permissions")
    } else {
        context
    }
}

/// Build an [`ErrorContext`] with suggestions for a known [`LockError`].
pub fn create_error_context(error: &LockError) -> ErrorContext {
    match error {
        LockError::InvalidArgument {
            argument,
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Check the value passed for '{argument}'")),
        LockError::RuntimeUnavailable {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Create the registry from inside a tokio runtime, or pass a runtime handle",
            )
            .with_details("Lock callbacks are scheduled as tokio tasks"),
        LockError::Abandoned {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Raise max_queue_size or pick a different overflow_strategy")
            .with_details("Waiters evicted by the overflow policy never run"),
        LockError::ConfigError {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Run 'namelock config show' to inspect the effective configuration"),
    }
}
