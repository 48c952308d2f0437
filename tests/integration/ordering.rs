use crate::WAIT;
use namelock::test_utils::{CallLog, HeldGuards, init_test_logging, wait_for};
use namelock::{LockOptionsPatch, LockRegistry, TicketState};
use std::sync::Arc;

#[tokio::test]
async fn test_configured_lock_starts_unlocked_and_empty() {
    init_test_logging(None);
    let registry = LockRegistry::new().unwrap();

    registry.set_options("N", LockOptionsPatch::new()).unwrap();
    assert_eq!(registry.is_locked("N").unwrap(), Some(false));
    assert_eq!(registry.queue_size("N").unwrap(), Some(0));
}

#[tokio::test]
async fn test_first_caller_runs_first() {
    let registry = LockRegistry::new().unwrap();
    let log = CallLog::new();

    for label in ["one", "two", "three", "four"] {
        registry.lock("N", log.recorder(label), None).unwrap();
    }

    assert!(wait_for(|| log.len() == 4, WAIT).await);
    assert_eq!(log.entries(), ["one", "two", "three", "four"]);
    assert_eq!(registry.is_locked("N").unwrap(), Some(false));
}

#[tokio::test]
async fn test_second_caller_waits_for_release() {
    let registry = LockRegistry::new().unwrap();
    let held = HeldGuards::new();
    let log = CallLog::new();

    registry.lock("N", held.capture("cb"), None).unwrap();
    assert!(wait_for(|| held.len() == 1, WAIT).await);

    let second = registry.lock("N", log.recorder("cb2"), None).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    assert!(log.is_empty());
    assert_eq!(registry.queue_size("N").unwrap(), Some(1));
    assert_eq!(second.state(), TicketState::Queued);

    held.release_all();
    assert!(wait_for(|| log.entries() == ["cb2"], WAIT).await);
    assert_eq!(registry.queue_size("N").unwrap(), Some(0));
    assert_eq!(second.state(), TicketState::Retired);
}

#[tokio::test]
async fn test_guard_moved_into_task_holds_lock() {
    let registry = LockRegistry::new().unwrap();
    let log = CallLog::new();
    let worker_log = log.clone();

    registry
        .lock(
            "N",
            move |guard| {
                tokio::spawn(async move {
                    worker_log.record("start");
                    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                    worker_log.record("end");
                    guard.release();
                });
            },
            None,
        )
        .unwrap();
    registry.lock("N", log.recorder("next"), None).unwrap();

    assert!(wait_for(|| log.len() == 3, WAIT).await);
    assert_eq!(log.entries(), ["start", "end", "next"]);
}

#[tokio::test]
async fn test_bulk_flush_runs_waiters_immediately() {
    let registry = Arc::new(LockRegistry::new().unwrap());
    let held = HeldGuards::new();
    let log = CallLog::new();

    registry.lock("N", held.capture("holder"), None).unwrap();
    for label in ["a", "b", "c"] {
        registry.lock("N", log.recorder(label), None).unwrap();
    }

    assert_eq!(registry.release_queue("N").unwrap(), 3);
    assert_eq!(log.entries(), ["a", "b", "c"]);
    assert_eq!(registry.queue_size("N").unwrap(), Some(0));
    assert_eq!(registry.is_locked("N").unwrap(), Some(true));

    assert!(wait_for(|| held.len() == 1, WAIT).await);
    held.release_all();
    assert_eq!(registry.is_locked("N").unwrap(), Some(false));
}

#[tokio::test]
async fn test_independent_registries() {
    let first = LockRegistry::new().unwrap();
    let second = LockRegistry::new().unwrap();
    let held = HeldGuards::new();
    let log = CallLog::new();

    first.lock("shared", held.capture("first"), None).unwrap();
    second.lock("shared", log.recorder("second"), None).unwrap();

    assert!(wait_for(|| log.len() == 1, WAIT).await);
    assert_eq!(first.is_locked("shared").unwrap(), Some(true));
    held.release_all();
}
