//! Concurrency-facing integration tests for the lock coordinator.
//!
//! All tests run against [`MemoryStore`]; two coordinators sharing one
//! store model two service instances contending across the network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio_util::sync::CancellationToken;
use warden_core::error::LockError;
use warden_lock::{
    LeasePolicy, LockConfig, LockContext, LockCoordinator, LockKind, LockSpec, WaitPolicy,
};
use warden_store::MemoryStore;

fn fixed(secs: u64) -> LeasePolicy {
    LeasePolicy::Fixed(Duration::from_secs(secs))
}

/// Two coordinators over one shared store (two "instances").
fn two_instances() -> (Arc<LockCoordinator>, Arc<LockCoordinator>) {
    let store = Arc::new(MemoryStore::new());
    (
        Arc::new(LockCoordinator::new(store.clone())),
        Arc::new(LockCoordinator::new(store)),
    )
}

// ---------------------------------------------------------------------------
// Mutual exclusion & reentrancy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_no_wait_mutual_exclusion() {
    let (a, b) = two_instances();
    let owner_a = a.owner();
    let owner_b = b.owner();

    let guard = a
        .try_acquire("job:sync", LockKind::Reentrant, &owner_a, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("first acquire must succeed");

    // The other instance is refused immediately.
    let err = b
        .try_acquire("job:sync", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
        .await
        .expect_err("second acquire must be refused");
    assert_matches!(err, LockError::AcquireTimedOut { .. });

    guard.release().await;

    let guard = b
        .try_acquire("job:sync", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("acquire after release must succeed");
    guard.release().await;
}

#[tokio::test]
async fn test_reentrant_acquire_requires_matching_releases() {
    let (a, b) = two_instances();
    let owner = a.owner();
    let other = b.owner();

    let first = a
        .try_acquire("job:sync", LockKind::Reentrant, &owner, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("first hold");
    let second = a
        .try_acquire("job:sync", LockKind::Reentrant, &owner, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("reentrant re-acquire by the same owner must not block");

    assert_eq!(a.hold_count("job:sync").await.unwrap(), 2);

    first.release().await;
    // One release down, still held.
    assert_matches!(
        b.try_acquire("job:sync", LockKind::Reentrant, &other, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    second.release().await;
    let guard = b
        .try_acquire("job:sync", LockKind::Reentrant, &other, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("free after both releases");
    guard.release().await;
}

#[tokio::test]
async fn test_bounded_wait_succeeds_when_holder_releases() {
    let (a, b) = two_instances();
    let owner_a = a.owner();

    let guard = a
        .try_acquire("queue:drain", LockKind::Reentrant, &owner_a, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    let waiter = {
        let b = Arc::clone(&b);
        tokio::spawn(async move {
            let owner = b.owner();
            b.try_acquire(
                "queue:drain",
                LockKind::Reentrant,
                &owner,
                WaitPolicy::Timeout(Duration::from_secs(5)),
                fixed(30),
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    guard.release().await;

    let guard = waiter
        .await
        .unwrap()
        .expect("waiter must obtain the lock after release");
    guard.release().await;
}

// ---------------------------------------------------------------------------
// Read / write
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_readers_exclude_writer() {
    let (a, b) = two_instances();
    let r1 = a.owner();
    let r2 = b.owner();
    let w = b.owner();

    let read_1 = a
        .try_acquire("catalog", LockKind::Read, &r1, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("first reader");
    let read_2 = b
        .try_acquire("catalog", LockKind::Read, &r2, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("second concurrent reader");

    assert_matches!(
        b.try_acquire("catalog", LockKind::Write, &w, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    read_1.release().await;
    // One reader remains; the writer is still excluded.
    assert_matches!(
        b.try_acquire("catalog", LockKind::Write, &w, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    read_2.release().await;
    let write = b
        .try_acquire("catalog", LockKind::Write, &w, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("writer after all readers released");
    write.release().await;
}

#[tokio::test]
async fn test_writer_excludes_readers() {
    let (a, b) = two_instances();
    let w = a.owner();
    let r = b.owner();

    let write = a
        .try_acquire("catalog", LockKind::Write, &w, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    assert_matches!(
        b.try_acquire("catalog", LockKind::Read, &r, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    write.release().await;
    let read = b
        .try_acquire("catalog", LockKind::Read, &r, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("reader after writer released");
    read.release().await;
}

// ---------------------------------------------------------------------------
// Fairness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fair_lock_grants_in_arrival_order() {
    let (a, b) = two_instances();
    let holder = a.owner();
    let order: Arc<tokio::sync::Mutex<Vec<&'static str>>> =
        Arc::new(tokio::sync::Mutex::new(Vec::new()));

    let guard = a
        .try_acquire("fair:key", LockKind::Fair, &holder, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    let spawn_waiter = |coordinator: Arc<LockCoordinator>,
                        name: &'static str,
                        order: Arc<tokio::sync::Mutex<Vec<&'static str>>>| {
        tokio::spawn(async move {
            let owner = coordinator.owner();
            let guard = coordinator
                .try_acquire(
                    "fair:key",
                    LockKind::Fair,
                    &owner,
                    WaitPolicy::Timeout(Duration::from_secs(5)),
                    fixed(30),
                )
                .await
                .expect("fair waiter must eventually acquire");
            order.lock().await.push(name);
            tokio::time::sleep(Duration::from_millis(50)).await;
            guard.release().await;
        })
    };

    // b enqueues first, then c; arrival order must be served.
    let waiter_b = spawn_waiter(Arc::clone(&b), "b", Arc::clone(&order));
    tokio::time::sleep(Duration::from_millis(150)).await;
    let waiter_c = spawn_waiter(Arc::clone(&a), "c", Arc::clone(&order));
    tokio::time::sleep(Duration::from_millis(150)).await;

    guard.release().await;
    waiter_b.await.unwrap();
    waiter_c.await.unwrap();

    assert_eq!(*order.lock().await, vec!["b", "c"]);
}

// ---------------------------------------------------------------------------
// Leases, watchdog, cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_expired_lease_frees_the_lock() {
    let (a, b) = two_instances();
    let owner_a = a.owner();
    let owner_b = b.owner();

    let _guard = a
        .try_acquire(
            "short:lease",
            LockKind::Reentrant,
            &owner_a,
            WaitPolicy::NoWait,
            LeasePolicy::Fixed(Duration::from_millis(200)),
        )
        .await
        .unwrap();

    assert_matches!(
        b.try_acquire("short:lease", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    let guard = b
        .try_acquire("short:lease", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("expired holder must be pruned");
    guard.release().await;
}

#[tokio::test]
async fn test_watchdog_keeps_lock_alive_past_nominal_lease() {
    let store = Arc::new(MemoryStore::new());
    let config = LockConfig {
        watchdog_lease: Duration::from_millis(300),
        retry_interval: Duration::from_millis(50),
    };
    let a = LockCoordinator::with_config(store.clone(), config.clone());
    let b = LockCoordinator::with_config(store, config);
    let owner_a = a.owner();
    let owner_b = b.owner();

    let guard = a
        .try_acquire(
            "long:section",
            LockKind::Reentrant,
            &owner_a,
            WaitPolicy::NoWait,
            LeasePolicy::Watchdog,
        )
        .await
        .unwrap();

    // Well past the rolling lease; the watchdog must have renewed it.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_matches!(
        b.try_acquire("long:section", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
            .await,
        Err(LockError::AcquireTimedOut { .. })
    );

    guard.release().await;
    let guard = b
        .try_acquire("long:section", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
        .await
        .expect("release must stop the watchdog and free the lock");
    guard.release().await;
}

#[tokio::test]
async fn test_cancelled_wait_reports_interrupted_and_holds_nothing() {
    let (a, b) = two_instances();
    let owner_a = a.owner();

    let guard = a
        .try_acquire("busy", LockKind::Fair, &owner_a, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let waiter = {
        let b = Arc::clone(&b);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let owner = b.owner();
            b.try_acquire_with_cancel(
                "busy",
                LockKind::Fair,
                &owner,
                WaitPolicy::Forever,
                fixed(30),
                &cancel,
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();

    let err = waiter.await.unwrap().expect_err("cancelled wait must fail");
    assert_matches!(err, LockError::AcquireInterrupted { .. });

    // The abandoned waiter must not block the next fair acquisition.
    guard.release().await;
    let owner = b.owner();
    let guard = b
        .try_acquire(
            "busy",
            LockKind::Fair,
            &owner,
            WaitPolicy::Timeout(Duration::from_secs(1)),
            fixed(30),
        )
        .await
        .expect("queue entry of the cancelled waiter must be gone");
    guard.release().await;
}

// ---------------------------------------------------------------------------
// Multi-lock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_multi_lock_is_all_or_nothing() {
    let (a, b) = two_instances();
    let owner_a = a.owner();
    let owner_b = b.owner();

    let blocker = b
        .try_acquire("acct:B", LockKind::Reentrant, &owner_b, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    // "acct:A" is free but the composite must not keep it.
    let err = a
        .try_acquire_multi(
            &["acct:A", "acct:B"],
            LockKind::Reentrant,
            &owner_a,
            WaitPolicy::NoWait,
            fixed(30),
        )
        .await
        .expect_err("composite must fail while acct:B is held");
    assert_matches!(err, LockError::AcquireTimedOut { .. });
    assert!(!a.is_locked("acct:A").await.unwrap(), "partial hold must be rolled back");

    blocker.release().await;

    let guard = a
        .try_acquire_multi(
            &["acct:A", "acct:B"],
            LockKind::Reentrant,
            &owner_a,
            WaitPolicy::NoWait,
            fixed(30),
        )
        .await
        .expect("composite must succeed once both keys are free");
    assert_eq!(guard.len(), 2);
    guard.release().await;
    assert!(!a.is_locked("acct:A").await.unwrap());
    assert!(!a.is_locked("acct:B").await.unwrap());
}

// ---------------------------------------------------------------------------
// Declarative wrapper
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_with_lock_never_runs_op_when_unavailable() {
    let (a, b) = two_instances();
    let owner = a.owner();
    let _guard = a
        .try_acquire("report:nightly", LockKind::Reentrant, &owner, WaitPolicy::NoWait, fixed(30))
        .await
        .unwrap();

    let ran = AtomicBool::new(false);
    let spec = LockSpec::new("report:nightly").wait_secs(0);
    let result: Result<(), LockError> = b
        .with_lock(&spec, &LockContext::new(), || async {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert_matches!(result, Err(LockError::LockUnavailable { .. }));
    assert!(!ran.load(Ordering::SeqCst), "guarded op must not run without the lock");
}

#[derive(Debug)]
enum TransferError {
    Lock(LockError),
    InsufficientFunds,
}

impl From<LockError> for TransferError {
    fn from(e: LockError) -> Self {
        TransferError::Lock(e)
    }
}

#[tokio::test]
async fn test_with_lock_propagates_op_error_after_release() {
    let (a, _) = two_instances();
    let spec = LockSpec::new("acct:transfer").wait_secs(0);

    let result: Result<(), TransferError> = a
        .with_lock(&spec, &LockContext::new(), || async {
            Err(TransferError::InsufficientFunds)
        })
        .await;
    assert_matches!(result, Err(TransferError::InsufficientFunds));

    // The failed operation must still have released the lock.
    assert!(!a.is_locked("acct:transfer").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_serialize_on_derived_key() {
    let (a, b) = two_instances();
    let in_section = Arc::new(AtomicUsize::new(0));
    let spec = LockSpec::with_expression("'account:' + #from + ':to:' + #to");

    let transfer = |coordinator: Arc<LockCoordinator>,
                    in_section: Arc<AtomicUsize>,
                    spec: LockSpec| async move {
        let ctx = LockContext::new().bind("from", "A").bind("to", "B");
        coordinator
            .with_lock(&spec, &ctx, || async {
                let concurrent = in_section.fetch_add(1, Ordering::SeqCst);
                assert_eq!(concurrent, 0, "critical section must be exclusive");
                tokio::time::sleep(Duration::from_millis(80)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, LockError>(())
            })
            .await
    };

    let (left, right) = tokio::join!(
        transfer(Arc::clone(&a), Arc::clone(&in_section), spec.clone()),
        transfer(Arc::clone(&b), Arc::clone(&in_section), spec.clone()),
    );

    left.expect("first transfer must complete");
    right.expect("second transfer must complete");
    assert!(!a.is_locked("account:A:to:B").await.unwrap());
}
