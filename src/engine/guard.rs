//! Ownership capability handed to a lock callback.

use super::LockEngine;
use super::token::TokenId;
use std::fmt;
use std::sync::Arc;

/// Proof of a grant on a named lock.
///
/// Every callback receives the guard created for its own token. Releasing the
/// guard hands the lock to the oldest waiter that is still live. Only the guard
/// of the current owner can release the lock; guards handed out by a bulk
/// flush never own it, so releasing them changes nothing.
///
/// Dropping an unreleased guard releases it. Keep the guard alive (move it into
/// the task doing the work) for as long as the critical section lasts.
pub struct LockGuard {
    engine: Arc<LockEngine>,
    token: TokenId,
    released: bool,
}

impl LockGuard {
    pub(crate) fn new(engine: Arc<LockEngine>, token: TokenId) -> Self {
        Self {
            engine,
            token,
            released: false,
        }
    }

    /// Identifier of the token this guard was created for.
    pub fn token_id(&self) -> TokenId {
        self.token
    }

    /// Name of the guarded lock.
    pub fn lock_name(&self) -> &str {
        self.engine.name()
    }

    /// True while this guard's token is the current owner.
    pub fn owns_lock(&self) -> bool {
        self.engine.owner() == Some(self.token)
    }

    /// Release the lock and hand it to the next live waiter.
    pub fn release(mut self) {
        self.finish(false);
    }

    /// Release the lock and cancel every queued waiter without running any.
    ///
    /// The lock ends up unlocked with an empty queue.
    pub fn release_and_abort(mut self) {
        self.finish(true);
    }

    fn finish(&mut self, abort_pending: bool) {
        if !self.released {
            self.released = true;
            self.engine.leave(self.token, abort_pending);
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.finish(false);
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("lock", &self.engine.name())
            .field("token", &self.token)
            .field("released", &self.released)
            .finish()
    }
}
