//! Per-lock options: queue bound and overflow eviction strategy.
//!
//! Options are plain `Copy` values. Every read through the registry hands out
//! a copy, so callers can never mutate the live configuration of an engine.
//!
//! In TOML the options look like this:
//!
//! ```toml
//! max_queue_size = 8            # or "unbounded"
//! overflow_strategy = "first"   # "this" | "first" | "last"
//! ```

use crate::constants::UNBOUNDED_KEYWORD;
use crate::core::LockError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Which waiters to evict when the queue grows past its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowStrategy {
    /// Reject the newest arrival. Removes exactly one waiter per overflow.
    #[default]
    This,
    /// Evict the oldest waiters from the front of the queue.
    First,
    /// Evict the waiters queued right before the newest arrival.
    Last,
}

impl OverflowStrategy {
    /// All strategies, in documentation order.
    pub const ALL: [OverflowStrategy; 3] = [Self::This, Self::First, Self::Last];

    /// The lowercase keyword used in configuration files and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::This => "this",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowStrategy {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|strategy| strategy.as_str() == s).ok_or_else(|| {
            LockError::invalid_argument(
                "overflow_strategy",
                format!("unknown strategy '{s}', expected one of: this, first, last"),
            )
        })
    }
}

/// Upper bound on the number of queued waiters for one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "QueueLimitRepr", into = "QueueLimitRepr")]
pub enum QueueLimit {
    /// The queue may grow without limit.
    #[default]
    Unbounded,
    /// At most this many waiters stay queued.
    Bounded(NonZeroUsize),
}

impl QueueLimit {
    /// Build a bounded limit, rejecting zero.
    pub fn bounded(max: usize) -> Result<Self, LockError> {
        NonZeroUsize::new(max).map(Self::Bounded).ok_or_else(|| {
            LockError::invalid_argument("max_queue_size", "must be a positive integer")
        })
    }

    /// The bound as a plain number, `None` when unbounded.
    pub fn get(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(max) => Some(max.get()),
        }
    }
}

impl fmt::Display for QueueLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str(UNBOUNDED_KEYWORD),
            Self::Bounded(max) => write!(f, "{max}"),
        }
    }
}

impl FromStr for QueueLimit {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(UNBOUNDED_KEYWORD) {
            return Ok(Self::Unbounded);
        }
        let max: usize = s.parse().map_err(|_| {
            LockError::invalid_argument(
                "max_queue_size",
                format!("'{s}' is neither a positive integer nor \"{UNBOUNDED_KEYWORD}\""),
            )
        })?;
        Self::bounded(max)
    }
}

/// Wire shape of [`QueueLimit`]: a number or the `"unbounded"` keyword.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum QueueLimitRepr {
    Count(i64),
    Keyword(String),
}

impl TryFrom<QueueLimitRepr> for QueueLimit {
    type Error = LockError;

    fn try_from(repr: QueueLimitRepr) -> Result<Self, Self::Error> {
        match repr {
            QueueLimitRepr::Count(count) => {
                let max = usize::try_from(count).map_err(|_| {
                    LockError::invalid_argument("max_queue_size", "must be a positive integer")
                })?;
                Self::bounded(max)
            }
            QueueLimitRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<QueueLimit> for QueueLimitRepr {
    fn from(limit: QueueLimit) -> Self {
        match limit {
            QueueLimit::Unbounded => Self::Keyword(UNBOUNDED_KEYWORD.to_string()),
            QueueLimit::Bounded(max) => Self::Count(i64::try_from(max.get()).unwrap_or(i64::MAX)),
        }
    }
}

/// Effective options of one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Maximum number of queued waiters (default: unbounded).
    pub max_queue_size: QueueLimit,
    /// Eviction strategy applied when the queue exceeds `max_queue_size`.
    pub overflow_strategy: OverflowStrategy,
}

impl LockOptions {
    /// Shallow merge: every field set in `patch` replaces the current value.
    #[must_use]
    pub fn merge(&self, patch: &LockOptionsPatch) -> Self {
        Self {
            max_queue_size: patch.max_queue_size.unwrap_or(self.max_queue_size),
            overflow_strategy: patch.overflow_strategy.unwrap_or(self.overflow_strategy),
        }
    }
}

/// A partial set of options, merged over existing options by
/// [`crate::LockRegistry::set_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptionsPatch {
    /// New queue bound, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<QueueLimit>,
    /// New overflow strategy, if supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_strategy: Option<OverflowStrategy>,
}

impl LockOptionsPatch {
    /// An empty patch; merging it changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue bound.
    #[must_use]
    pub fn max_queue_size(mut self, limit: QueueLimit) -> Self {
        self.max_queue_size = Some(limit);
        self
    }

    /// Set the overflow strategy.
    #[must_use]
    pub fn overflow_strategy(mut self, strategy: OverflowStrategy) -> Self {
        self.overflow_strategy = Some(strategy);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.max_queue_size.is_none() && self.overflow_strategy.is_none()
    }
}

impl From<LockOptions> for LockOptionsPatch {
    fn from(options: LockOptions) -> Self {
        Self {
            max_queue_size: Some(options.max_queue_size),
            overflow_strategy: Some(options.overflow_strategy),
        }
    }
}
