//! Error handling for namelock
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`LockError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! Argument validation failures are always reported as
//! [`LockError::InvalidArgument`]. The plain locking API returns them directly;
//! the future-returning API delivers them through the returned future.
//!
//! Timeout cancellation and overflow eviction are silent policies and never
//! produce an error on the plain API. Only [`crate::LockRegistry::lock_async`]
//! observes a discarded waiter, as [`LockError::Abandoned`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use namelock::core::{ErrorContext, LockError};
//!
//! let error = LockError::invalid_argument("name", "lock name must not be empty");
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Pass a non-empty lock name");
//!
//! // Display with colors in terminal
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for namelock operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// An argument failed validation (empty lock name, zero queue bound, unknown strategy).
    ///
    /// No side effects happen when this error is returned.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        argument: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// No tokio runtime was available to schedule lock callbacks on.
    #[error("No async runtime available: {reason}")]
    RuntimeUnavailable {
        /// Reason reported by the runtime lookup
        reason: String,
    },

    /// A waiter was discarded before its work could complete.
    ///
    /// Raised by the future-returning API when its waiter was evicted by the
    /// overflow policy, drained by an aborting release, or its work panicked.
    #[error("Waiter on lock '{name}' was discarded before it completed")]
    Abandoned {
        /// Lock the waiter was queued on
        name: String,
    },

    /// Configuration file or option value could not be used.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },
}

impl LockError {
    /// Shorthand for [`LockError::InvalidArgument`].
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Returns true for argument validation failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`LockError`] with an optional suggestion and details line, shown
/// by the CLI when a command fails.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LockError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: LockError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
