//! Graceful and forceful shutdown semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use taskpool::RejectionPolicy;

use crate::helpers::{self, Blocker, WAIT};

#[test]
fn test_graceful_shutdown_drains_queue() {
    helpers::init_tracing();

    let pool = helpers::pool(1, 1, 4, RejectionPolicy::Abort);
    let ran = Arc::new(AtomicUsize::new(0));

    let (gate, job) = Blocker::task();
    pool.execute(job).unwrap();
    gate.wait_started();

    for _ in 0..2 {
        let counter = Arc::clone(&ran);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.shutdown();
    assert!(pool.is_shutdown());
    assert!(!pool.is_shutdown_now());

    // No new work after shutdown, but queued work still completes.
    assert!(pool.execute(|| {}).unwrap_err().is_closed());
    assert!(pool.submit(|| 1).unwrap_err().is_closed());

    gate.release();
    assert!(pool.await_termination_timeout(WAIT));
    assert_eq!(ran.load(Ordering::SeqCst), 2);
    assert_eq!(pool.worker_count(), 0);
}

#[test]
fn test_shutdown_is_idempotent() {
    let pool = helpers::pool(2, 2, 4, RejectionPolicy::Abort);

    pool.shutdown();
    pool.shutdown();

    assert!(pool.is_shutdown());
    assert!(pool.await_termination_timeout(WAIT));
}

#[test]
fn test_shutdown_now_discards_queued_tasks() {
    let pool = helpers::pool(1, 1, 4, RejectionPolicy::Abort);
    let finished = Arc::new(AtomicUsize::new(0));

    let (gate, job) = Blocker::task();
    let counter = Arc::clone(&finished);
    pool.execute(move || {
        job();
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    gate.wait_started();

    let queued = pool.submit(|| "never runs").unwrap();

    pool.shutdown_now();
    assert!(pool.is_shutdown_now());

    gate.release();
    assert!(pool.await_termination_timeout(WAIT));

    // The queued task was cleared; the running one was not preempted.
    assert!(queued.join().unwrap_err().is_discarded());
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shutdown_now_wakes_idle_workers() {
    // Default keep-alive is 60s; termination must not wait for it.
    let pool = helpers::pool(2, 2, 4, RejectionPolicy::Abort);

    let started = Instant::now();
    pool.shutdown_now();
    assert!(pool.await_termination_timeout(Duration::from_secs(2)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_shutdown_now_is_idempotent() {
    let pool = helpers::pool(2, 2, 4, RejectionPolicy::Abort);

    pool.shutdown_now();
    pool.shutdown_now();

    assert!(pool.is_shutdown_now());
    assert!(pool.await_termination_timeout(WAIT));
}

#[test]
fn test_forceful_escalates_graceful_shutdown() {
    let pool = helpers::pool(1, 1, 4, RejectionPolicy::Abort);

    let (gate, job) = Blocker::task();
    pool.execute(job).unwrap();
    gate.wait_started();

    let queued = pool.submit(|| "never runs").unwrap();

    // Graceful first: the queued task would normally still run.
    pool.shutdown();
    // Escalate: now it must be discarded.
    pool.shutdown_now();
    assert!(pool.is_shutdown_now());

    gate.release();
    assert!(pool.await_termination_timeout(WAIT));
    assert!(queued.join().unwrap_err().is_discarded());
}
