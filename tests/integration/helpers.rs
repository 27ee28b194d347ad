//! Test helpers and utilities.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use taskpool::{PoolConfig, RejectionPolicy, ThreadPool};

/// Generous deadline for anything that should happen "immediately".
pub const WAIT: Duration = Duration::from_secs(5);

/// Install a test subscriber once; enable with RUST_LOG.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Build a small pool for admission tests.
pub fn pool(core: usize, max: usize, capacity: usize, policy: RejectionPolicy) -> ThreadPool {
    let config = PoolConfig::builder()
        .core_threads(core)
        .max_threads(max)
        .queue_capacity(capacity)
        .rejection_policy(policy)
        .build()
        .expect("valid test config");
    ThreadPool::new(config)
}

/// Controller for a task that signals when it starts and blocks until
/// released.
pub struct Blocker {
    started: Receiver<()>,
    release: Sender<()>,
}

impl Blocker {
    /// Create a gate and the task bound to it.
    pub fn task() -> (Blocker, Box<dyn FnOnce() + Send>) {
        let (started_tx, started_rx) = bounded(1);
        let (release_tx, release_rx) = bounded::<()>(1);
        let job = Box::new(move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        });
        (
            Blocker {
                started: started_rx,
                release: release_tx,
            },
            job,
        )
    }

    /// Wait until a worker started running the task.
    pub fn wait_started(&self) {
        self.started
            .recv_timeout(WAIT)
            .expect("task did not start in time");
    }

    /// Let the task finish. Harmless if the task never ran.
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

/// Poll `condition` until it holds or the deadline passes.
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
