//! Tokens: one claim on a lock per `enter` call.
//!
//! The engine owns the [`Token`] itself (callback, timer, cancel flag). Callers
//! get a [`Ticket`], a non-owning handle that can observe or cancel the claim
//! but can never release ownership; only a [`LockGuard`] can do that.

use super::LockEngine;
use super::guard::LockGuard;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::AbortHandle;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing token identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

impl TokenId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work run once a token becomes the owner.
pub(crate) type Callback = Box<dyn FnOnce(LockGuard) + Send + 'static>;

pub(crate) struct Token {
    pub(crate) id: TokenId,
    pub(crate) callback: Callback,
    pub(crate) created_at: Instant,
    /// Pending timeout timer; present only while queued with a timeout.
    pub(crate) timeout: Option<AbortHandle>,
    /// Once set, the token is never granted ownership.
    pub(crate) canceled: bool,
}

impl Token {
    pub(crate) fn new(callback: Callback) -> Self {
        Self {
            id: TokenId::next(),
            callback,
            created_at: Instant::now(),
            timeout: None,
            canceled: false,
        }
    }

    /// Abort the pending timeout timer, if any.
    pub(crate) fn disarm(&mut self) {
        if let Some(timer) = self.timeout.take() {
            timer.abort();
        }
    }

    pub(crate) fn cancel(&mut self) {
        self.canceled = true;
        self.disarm();
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("armed", &self.timeout.is_some())
            .field("canceled", &self.canceled)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    /// Waiting in the queue, not canceled.
    Queued,
    /// Currently owns the lock.
    Running,
    /// Released, canceled, evicted or flushed. Never reachable again.
    Retired,
}

/// Caller-side handle of a token returned by [`LockEngine::enter`].
#[derive(Debug, Clone)]
pub struct Ticket {
    id: TokenId,
    lock_name: Arc<str>,
    created_at: Instant,
    engine: Weak<LockEngine>,
}

impl Ticket {
    pub(crate) fn new(
        id: TokenId,
        lock_name: Arc<str>,
        created_at: Instant,
        engine: Weak<LockEngine>,
    ) -> Self {
        Self {
            id,
            lock_name,
            created_at,
            engine,
        }
    }

    /// Identifier of the underlying token.
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Name of the lock this ticket was issued by.
    pub fn lock_name(&self) -> &str {
        &self.lock_name
    }

    /// When the token was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time since the token was created.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Current state of the token.
    pub fn state(&self) -> TicketState {
        self.engine.upgrade().map_or(TicketState::Retired, |engine| engine.token_state(self.id))
    }

    /// Cancel the token if it is still queued.
    ///
    /// Behaves like an expired timeout: the waiter is skipped when the queue is
    /// walked and its callback never runs. A running owner is never preempted;
    /// returns false if the token was not queued.
    pub fn cancel(&self) -> bool {
        self.engine.upgrade().is_some_and(|engine| engine.cancel_waiter(self.id))
    }
}
