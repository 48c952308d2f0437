//! Future-returning entry into a named lock.

use super::{LockRegistry, validate_name};
use crate::core::LockError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::oneshot;

impl LockRegistry {
    /// Run `work` inside the critical section `name` and resolve with its result.
    ///
    /// The waiter is queued when this method is called, not when the returned
    /// future is first polled, so call order is arrival order. The lock is
    /// released exactly once, right after the future produced by `work` settles,
    /// and the returned future mirrors that result: `Ok` stays `Ok`, `Err`
    /// stays `Err`.
    ///
    /// Validation errors are delivered through the returned future, never
    /// directly. If the waiter is discarded without running (overflow eviction,
    /// or an aborting release) or `work` panics, the future resolves with
    /// [`LockError::Abandoned`].
    ///
    /// Awaiting `lock_async` on the same name from inside `work` never
    /// completes: the inner waiter queues behind the outer holder.
    pub fn lock_async<F, Fut, T, E>(&self, name: &str, work: F) -> BoxFuture<'static, Result<T, E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<LockError> + Send + 'static,
    {
        let entered = self.enter_async(name, work);
        async move {
            let (name, settled) = entered.map_err(E::from)?;
            match settled.await {
                Ok(outcome) => outcome,
                Err(_) => Err(E::from(LockError::Abandoned { name })),
            }
        }
        .boxed()
    }

    fn enter_async<F, Fut, T, E>(
        &self,
        name: &str,
        work: F,
    ) -> Result<(String, oneshot::Receiver<Result<T, E>>), LockError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        validate_name(name)?;
        let (settle, settled) = oneshot::channel();
        let runtime = self.runtime.clone();

        self.engine(name).enter(
            move |guard| {
                runtime.spawn(async move {
                    let outcome = work().await;
                    guard.release();
                    // The caller may have stopped waiting
                    let _ = settle.send(outcome);
                });
            },
            None,
        );

        Ok((name.to_string(), settled))
    }
}
