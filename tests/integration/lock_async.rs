use crate::WAIT;
use namelock::test_utils::wait_for;
use namelock::{LockError, LockOptionsPatch, LockRegistry, OverflowStrategy, QueueLimit};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, PartialEq)]
enum JobError {
    Lock(LockError),
    Failed(&'static str),
}

impl From<LockError> for JobError {
    fn from(error: LockError) -> Self {
        Self::Lock(error)
    }
}

#[tokio::test]
async fn test_outer_future_mirrors_success() {
    let registry = LockRegistry::new().unwrap();
    let value = registry.lock_async("A", || async { Ok::<_, JobError>("ok") }).await;

    assert_eq!(value, Ok("ok"));
    assert_eq!(registry.is_locked("A").unwrap(), Some(false));
}

#[tokio::test]
async fn test_outer_future_mirrors_failure() {
    let registry = LockRegistry::new().unwrap();
    let value =
        registry.lock_async("A", || async { Err::<(), _>(JobError::Failed("error")) }).await;

    assert_eq!(value, Err(JobError::Failed("error")));
    assert_eq!(registry.is_locked("A").unwrap(), Some(false));
}

#[tokio::test]
async fn test_lock_released_once_per_call() {
    let registry = Arc::new(LockRegistry::new().unwrap());
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut pending = Vec::new();
    for i in 0..10 {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        pending.push(registry.lock_async("A", move || async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            running.fetch_sub(1, Ordering::SeqCst);
            if i % 2 == 0 { Ok(i) } else { Err(JobError::Failed("odd")) }
        }));
    }

    let results = futures::future::join_all(pending).await;
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    for (i, result) in results.into_iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(result, Ok(i));
        } else {
            assert_eq!(result, Err(JobError::Failed("odd")));
        }
    }
    assert_eq!(registry.is_locked("A").unwrap(), Some(false));
    assert_eq!(registry.queue_size("A").unwrap(), Some(0));
}

#[tokio::test]
async fn test_arguments_are_captured_by_the_closure() {
    let registry = LockRegistry::new().unwrap();
    let (a, b) = (20, 22);
    let sum = registry.lock_async("A", move || async move { Ok::<_, LockError>(a + b) }).await;
    assert_eq!(sum, Ok(42));
}

#[tokio::test]
async fn test_evicted_waiter_is_abandoned() {
    let registry = LockRegistry::new().unwrap();
    registry
        .set_options(
            "A",
            LockOptionsPatch::new()
                .max_queue_size(QueueLimit::bounded(1).unwrap())
                .overflow_strategy(OverflowStrategy::This),
        )
        .unwrap();

    let holder = registry.lock_async("A", || async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, LockError>("holder")
    });
    let queued = registry.lock_async("A", || async { Ok::<_, LockError>("queued") });
    let rejected = registry.lock_async("A", || async { Ok::<_, LockError>("rejected") });

    assert_eq!(
        rejected.await,
        Err(LockError::Abandoned {
            name: "A".to_string()
        })
    );
    assert_eq!(holder.await, Ok("holder"));
    assert_eq!(queued.await, Ok("queued"));
}

#[tokio::test]
async fn test_panicking_work_releases_lock() {
    let registry = LockRegistry::new().unwrap();

    let panicked = registry.lock_async("A", || async {
        if true {
            panic!("work failed");
        }
        Ok::<(), LockError>(())
    });
    assert!(matches!(panicked.await, Err(LockError::Abandoned { .. })));

    assert!(wait_for(|| registry.is_locked("A").unwrap() == Some(false), WAIT).await);
    let after = registry.lock_async("A", || async { Ok::<_, LockError>(1) }).await;
    assert_eq!(after, Ok(1));
}
