//! Per-name lock engine.
//!
//! A [`LockEngine`] owns the waiter queue and the current owner of a single
//! named lock. Contenders are granted the lock one at a time in arrival order:
//!
//! ```text
//! enter(cb) ──► unlocked and queue empty? ──yes──► owner = token, spawn cb(guard)
//!                        │
//!                        no
//!                        ▼
//!               push_back(token), arm timeout, reduce_queue()
//!
//! guard.release() ──► owner = none ──► pop front until a live token
//!                                            │
//!                                            ▼
//!                                  owner = token, spawn cb(guard)
//! ```
//!
//! Callbacks always run as separate tokio tasks, never inline with the
//! `enter`/`release` call that granted ownership, so a callback re-entering the
//! engine cannot recurse into an in-progress mutation of the queue.
//!
//! Timed-out and evicted waiters are dropped silently: their callbacks never run
//! and they are skipped when the queue is walked.

pub mod guard;
pub mod overflow;
pub mod token;

pub use guard::LockGuard;
pub use overflow::reduce_queue;
pub use token::{Ticket, TicketState, TokenId};

use crate::config::{LockOptions, LockOptionsPatch};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use token::Token;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

#[derive(Debug, Default)]
struct EngineState {
    /// Waiters in arrival order. Canceled entries stay until a walk purges them.
    queue: VecDeque<Token>,
    owner: Option<TokenId>,
    options: LockOptions,
}

/// Mutual exclusion engine for one named resource.
pub struct LockEngine {
    name: Arc<str>,
    runtime: Handle,
    state: Mutex<EngineState>,
}

impl LockEngine {
    /// Create an engine that schedules callbacks on `runtime`.
    pub fn new(name: impl Into<Arc<str>>, options: LockOptions, runtime: Handle) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            runtime,
            state: Mutex::new(EngineState {
                options,
                ..EngineState::default()
            }),
        })
    }

    /// Name of the guarded resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the current options.
    pub fn options(&self) -> LockOptions {
        self.state().options
    }

    /// Merge `patch` over the current options and return the result.
    pub fn update_options(&self, patch: &LockOptionsPatch) -> LockOptions {
        let mut state = self.state();
        state.options = state.options.merge(patch);
        state.options
    }

    /// True while some token owns the lock.
    pub fn is_locked(&self) -> bool {
        self.state().owner.is_some()
    }

    /// Number of queued waiters, including canceled ones not yet purged.
    pub fn queue_size(&self) -> usize {
        self.state().queue.len()
    }

    /// Request the lock.
    ///
    /// If the lock is free and nobody is queued, the new token becomes the owner
    /// right away and `callback` is spawned. Otherwise the token joins the back
    /// of the queue; with a non-zero `timeout` it is canceled if still queued
    /// when the timeout fires. The overflow policy then runs against the queue.
    ///
    /// `callback` receives the [`LockGuard`] that releases the lock.
    pub fn enter<F>(self: &Arc<Self>, callback: F, timeout: Option<Duration>) -> Ticket
    where
        F: FnOnce(LockGuard) + Send + 'static,
    {
        let mut token = Token::new(Box::new(callback));
        let ticket =
            Ticket::new(token.id, Arc::clone(&self.name), token.created_at, Arc::downgrade(self));

        let mut state = self.state();
        if state.owner.is_none() && state.queue.is_empty() {
            state.owner = Some(token.id);
            drop(state);
            tracing::debug!("Lock '{}' granted to {} immediately", self.name, token.id);
            self.dispatch(token);
            return ticket;
        }

        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            token.timeout = Some(self.arm_timeout(token.id, timeout));
        }
        state.queue.push_back(token);
        let options = state.options;
        let mut evicted = reduce_queue(&mut state.queue, &options);
        let queued = state.queue.len();
        drop(state);

        tracing::debug!(
            "Lock '{}' busy, {} queued ({} waiting)",
            self.name,
            ticket.id(),
            queued
        );

        for token in &mut evicted {
            token.cancel();
            tracing::debug!(
                "Lock '{}' queue overflow ({}), evicted {}",
                self.name,
                options.overflow_strategy,
                token.id
            );
        }

        ticket
    }

    /// Release ownership held by `token` and grant the next live waiter.
    ///
    /// Does nothing unless `token` is the current owner. With `abort_pending`
    /// every queued waiter is canceled instead and the lock ends up free.
    pub(crate) fn leave(self: &Arc<Self>, token: TokenId, abort_pending: bool) {
        let mut state = self.state();
        if state.owner != Some(token) {
            tracing::trace!("Lock '{}': ignoring release from non-owner {}", self.name, token);
            return;
        }
        state.owner = None;

        let mut discarded = Vec::new();
        let mut next = None;
        while let Some(mut waiter) = state.queue.pop_front() {
            waiter.disarm();
            if waiter.canceled {
                discarded.push(waiter);
                continue;
            }
            if abort_pending {
                waiter.cancel();
                discarded.push(waiter);
                continue;
            }
            state.owner = Some(waiter.id);
            next = Some(waiter);
            break;
        }
        drop(state);

        tracing::debug!(
            "Lock '{}' released by {} (skipped {} canceled waiters)",
            self.name,
            token,
            discarded.len()
        );
        // Callbacks of discarded waiters are dropped outside the state mutex.
        drop(discarded);

        if let Some(waiter) = next {
            self.dispatch(waiter);
        }
    }

    /// Bulk flush: drain the whole queue and run every live waiter's callback
    /// synchronously, in FIFO order, on the calling thread.
    ///
    /// Ownership is left untouched. The flushed callbacks receive guards that
    /// do not own the lock. Returns the number of callbacks invoked.
    pub fn flush(self: &Arc<Self>) -> usize {
        let drained: Vec<Token> = self.state().queue.drain(..).collect();
        tracing::debug!("Lock '{}' flushing {} queued waiters", self.name, drained.len());

        let mut invoked = 0;
        for mut waiter in drained {
            waiter.disarm();
            if waiter.canceled {
                continue;
            }
            let guard = LockGuard::new(Arc::clone(self), waiter.id);
            (waiter.callback)(guard);
            invoked += 1;
        }
        invoked
    }

    pub(crate) fn owner(&self) -> Option<TokenId> {
        self.state().owner
    }

    pub(crate) fn token_state(&self, id: TokenId) -> TicketState {
        let state = self.state();
        if state.owner == Some(id) {
            TicketState::Running
        } else if state.queue.iter().any(|t| t.id == id && !t.canceled) {
            TicketState::Queued
        } else {
            TicketState::Retired
        }
    }

    pub(crate) fn cancel_waiter(&self, id: TokenId) -> bool {
        let mut state = self.state();
        match state.queue.iter_mut().find(|t| t.id == id && !t.canceled) {
            Some(waiter) => {
                waiter.cancel();
                tracing::debug!("Lock '{}': waiter {} canceled", self.name, id);
                true
            }
            None => false,
        }
    }

    /// Timer expiry: cancel the waiter if it is still queued.
    fn expire(&self, id: TokenId) {
        let mut state = self.state();
        if let Some(waiter) = state.queue.iter_mut().find(|t| t.id == id) {
            waiter.canceled = true;
            waiter.timeout = None;
            tracing::debug!(
                "Lock '{}': waiter {} timed out after {:?}",
                self.name,
                id,
                waiter.created_at.elapsed()
            );
        }
    }

    fn arm_timeout(self: &Arc<Self>, id: TokenId, timeout: Duration) -> AbortHandle {
        let engine = Arc::downgrade(self);
        self.runtime
            .spawn(async move {
                tokio::time::sleep(timeout).await;
                if let Some(engine) = engine.upgrade() {
                    engine.expire(id);
                }
            })
            .abort_handle()
    }

    /// Spawn the owner's callback on the runtime.
    ///
    /// A runtime that has shut down drops the task without polling it. The
    /// unused grant then releases with `abort_pending`, canceling the rest of
    /// the queue in one pass instead of dispatching each waiter into the same
    /// dead runtime.
    fn dispatch(self: &Arc<Self>, token: Token) {
        tracing::debug!(
            "Lock '{}' running {} after waiting {:?}",
            self.name,
            token.id,
            token.created_at.elapsed()
        );
        let mut grant = UnusedGrant(Some(LockGuard::new(Arc::clone(self), token.id)));
        let callback = token.callback;
        self.runtime.spawn(async move {
            if let Some(guard) = grant.0.take() {
                callback(guard);
            }
        });
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard of a spawned grant whose callback has not been invoked yet.
struct UnusedGrant(Option<LockGuard>);

impl Drop for UnusedGrant {
    fn drop(&mut self) {
        if let Some(guard) = self.0.take() {
            tracing::warn!(
                "Lock '{}': task for {} dropped before running, canceling queued waiters",
                guard.lock_name(),
                guard.token_id()
            );
            guard.release_and_abort();
        }
    }
}

impl fmt::Debug for LockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("LockEngine")
            .field("name", &self.name)
            .field("owner", &state.owner)
            .field("queued", &state.queue.len())
            .field("options", &state.options)
            .finish()
    }
}
