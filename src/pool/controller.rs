//! Pool controller: admission, growth, rejection and shutdown.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::config::PoolConfig;
use crate::error::{panic_message, PoolError, PoolResult};
use crate::factory::ThreadFactory;
use crate::handle::TaskHandle;
use crate::policy::RejectionPolicy;

use super::queue::TaskQueue;
use super::worker::Worker;
use super::{Executor, Job};

/// Pool lifecycle states. Transitions are strictly monotonic: a pool
/// never returns to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub(crate) enum Lifecycle {
    Running = 0,
    ShuttingDown = 1,
    Stopping = 2,
}

impl Lifecycle {
    fn from_u8(raw: u8) -> Lifecycle {
        match raw {
            0 => Lifecycle::Running,
            1 => Lifecycle::ShuttingDown,
            _ => Lifecycle::Stopping,
        }
    }
}

/// State shared between the pool handle and its workers.
pub(crate) struct Shared {
    /// The bounded task queue.
    pub(crate) queue: TaskQueue,
    /// Idle timeout used for the workers' timed take.
    pub(crate) keep_alive: Duration,
    /// Workers currently blocked waiting for a task.
    pub(crate) idle_workers: AtomicUsize,
    /// Accepted tasks not yet completed.
    pub(crate) in_flight: AtomicUsize,
    /// Worker count floor; workers at or below never retire.
    core_threads: usize,
    /// Tri-state lifecycle flag, see [`Lifecycle`].
    lifecycle: AtomicU8,
    /// Ids of live workers.
    registry: Mutex<HashSet<usize>>,
    /// Notified on every registry removal.
    terminated: Condvar,
}

impl Shared {
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::SeqCst))
    }

    /// Advance the lifecycle, returning the previous state. `fetch_max`
    /// keeps the transition monotonic under races.
    fn advance_lifecycle(&self, target: Lifecycle) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.fetch_max(target as u8, Ordering::SeqCst))
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    /// Atomically deregister the worker if the pool is above its core
    /// size. The check and the removal share the registry lock so two
    /// timed-out workers cannot both retire past the core count.
    pub(crate) fn retire_if_excess(&self, id: usize) -> bool {
        let mut registry = self.registry.lock().unwrap();
        if registry.len() > self.core_threads {
            registry.remove(&id);
            self.terminated.notify_all();
            true
        } else {
            false
        }
    }

    /// Remove the worker from the registry. Idempotent.
    pub(crate) fn deregister(&self, id: usize) {
        let mut registry = self.registry.lock().unwrap();
        registry.remove(&id);
        self.terminated.notify_all();
    }
}

/// A configurable bounded thread pool.
///
/// Tasks are distributed over `core..=max` worker threads through a
/// fixed-capacity FIFO queue. When the queue is full the pool grows; when
/// both queue and workers are saturated the configured
/// [`RejectionPolicy`] applies. See the [module docs](crate::pool) for
/// the architecture.
///
/// The pool is `Send + Sync`; share it between submitting threads with an
/// `Arc`. Dropping the last handle requests a graceful shutdown.
///
/// # Example
///
/// ```rust,ignore
/// use taskpool::{PoolConfig, ThreadPool};
///
/// let pool = ThreadPool::new(PoolConfig::builder().core_threads(4).build()?);
/// let handle = pool.submit(|| 2 + 2)?;
/// assert_eq!(handle.join()?, 4);
/// pool.shutdown();
/// ```
pub struct ThreadPool {
    /// State shared with the workers.
    shared: Arc<Shared>,
    /// Factory for worker threads.
    factory: Arc<dyn ThreadFactory>,
    /// Strategy applied when queue and workers are saturated.
    rejection_policy: RejectionPolicy,
    /// Minimum number of workers kept alive.
    core_threads: usize,
    /// Hard upper bound on live workers.
    max_threads: usize,
    /// Idle workers kept in reserve after each enqueue.
    min_spare_threads: usize,
    /// Source of worker ids.
    next_worker_id: AtomicUsize,
    /// Pool name for logging.
    name: String,
}

impl ThreadPool {
    /// Create a pool from a validated configuration.
    ///
    /// Exactly `core_threads` workers are started eagerly before this
    /// returns.
    pub fn new(config: PoolConfig) -> Self {
        let factory = config.thread_factory();
        let name = factory.pool_name().to_string();

        let shared = Arc::new(Shared {
            queue: TaskQueue::with_capacity(config.queue_capacity()),
            keep_alive: config.keep_alive(),
            idle_workers: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            core_threads: config.core_threads(),
            lifecycle: AtomicU8::new(Lifecycle::Running as u8),
            registry: Mutex::new(HashSet::new()),
            terminated: Condvar::new(),
        });

        let pool = Self {
            shared,
            factory,
            rejection_policy: config.rejection_policy(),
            core_threads: config.core_threads(),
            max_threads: config.max_threads(),
            min_spare_threads: config.min_spare_threads(),
            next_worker_id: AtomicUsize::new(0),
            name,
        };

        for _ in 0..pool.core_threads {
            pool.add_worker();
        }

        tracing::info!(
            pool = %pool.name,
            core = pool.core_threads,
            max = pool.max_threads,
            capacity = pool.shared.queue.capacity(),
            policy = pool.rejection_policy.as_str(),
            "thread pool started"
        );

        pool
    }

    /// Submit a fire-and-forget task.
    ///
    /// Fails with [`PoolError::Closed`] after shutdown was requested, or
    /// with [`PoolError::Rejected`] under overload with the `Abort`
    /// policy. A panic inside the task is caught and logged; it never
    /// takes the worker down.
    pub fn execute<F>(&self, task: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.admit(Box::new(task))
    }

    /// Submit a task and get a [`TaskHandle`] resolving to its outcome.
    ///
    /// The task's return value, or the panic it raised, is captured into
    /// the handle. Admission and rejection rules are identical to
    /// [`execute`](ThreadPool::execute); note that with the `Discard`
    /// policies a successfully submitted task may still never run, in
    /// which case the handle resolves to [`PoolError::Discarded`].
    pub fn submit<T, F>(&self, task: F) -> PoolResult<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task))
                .map_err(|payload| PoolError::TaskPanicked(panic_message(payload.as_ref())));
            let _ = tx.send(result);
        });
        self.admit(job)?;
        Ok(TaskHandle::new(rx))
    }

    /// Admission sequence: enqueue, grow, retry, reject.
    ///
    /// The growth check races with other producers and with retiring
    /// workers; the retried offer is authoritative for whether the
    /// rejection policy fires.
    fn admit(&self, job: Job) -> PoolResult<()> {
        if self.shared.lifecycle() != Lifecycle::Running {
            return Err(PoolError::Closed);
        }

        self.shared.in_flight.fetch_add(1, Ordering::SeqCst);

        match self.shared.queue.offer(job) {
            Ok(()) => {
                tracing::trace!(
                    pool = %self.name,
                    queued = self.shared.queue.len(),
                    "task accepted"
                );
                self.ensure_spare_workers();
                Ok(())
            }
            Err(job) => {
                if self.add_worker() {
                    match self.shared.queue.offer(job) {
                        Ok(()) => Ok(()),
                        Err(job) => self.reject(job),
                    }
                } else {
                    self.reject(job)
                }
            }
        }
    }

    /// Keep a warm margin of idle workers after a successful enqueue.
    ///
    /// The idle gauge is a coarse snapshot; overshooting or undershooting
    /// under concurrent bursts is acceptable.
    fn ensure_spare_workers(&self) {
        if self.min_spare_threads == 0 {
            return;
        }
        let idle = self.shared.idle_workers.load(Ordering::SeqCst);
        if idle < self.min_spare_threads && self.shared.worker_count() < self.max_threads {
            self.add_worker();
        }
    }

    /// Spawn one more worker if the registry is below `max_threads`.
    ///
    /// The bound check, the spawn and the registration share the registry
    /// lock, so a worker cannot deregister before it was registered.
    fn add_worker(&self) -> bool {
        let mut registry = self.shared.registry.lock().unwrap();
        if registry.len() >= self.max_threads {
            return false;
        }
        if self.shared.lifecycle() != Lifecycle::Running {
            return false;
        }

        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let worker = Worker::new(id, Arc::clone(&self.shared));
        match self.factory.spawn(Box::new(move || worker.run())) {
            Ok(_handle) => {
                registry.insert(id);
                tracing::debug!(pool = %self.name, workers = registry.len(), "worker added");
                true
            }
            Err(error) => {
                tracing::error!(pool = %self.name, %error, "failed to spawn worker thread");
                false
            }
        }
    }

    /// Apply the configured rejection policy to an unplaceable task.
    ///
    /// Expects the in-flight gauge to already count `job`; every path
    /// below either keeps that count (task placed or ran) or releases it.
    fn reject(&self, job: Job) -> PoolResult<()> {
        if self.shared.lifecycle() != Lifecycle::Running {
            // Shutdown raced with this submission.
            self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(PoolError::Closed);
        }

        tracing::warn!(
            pool = %self.name,
            policy = self.rejection_policy.as_str(),
            "task rejected due to overload"
        );

        match self.rejection_policy {
            RejectionPolicy::Abort => {
                self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                Err(PoolError::Rejected {
                    capacity: self.shared.queue.capacity(),
                    workers: self.shared.worker_count(),
                })
            }
            RejectionPolicy::CallerRuns => {
                // Same fault boundary as the workers: a panicking task
                // reports through its handle or the log, not by
                // unwinding the submitting thread.
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    tracing::error!(
                        pool = %self.name,
                        panic = %panic_message(payload.as_ref()),
                        "caller-run task panicked"
                    );
                }
                self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
            RejectionPolicy::DiscardOldest => {
                if let Some(oldest) = self.shared.queue.evict_oldest() {
                    // Dropping the job resolves its handle as discarded.
                    drop(oldest);
                    self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                }
                match self.shared.queue.offer(job) {
                    Ok(()) => Ok(()),
                    Err(job) => {
                        // A racing producer refilled the freed slot; the
                        // new task loses.
                        tracing::warn!(pool = %self.name, "discard-oldest lost its slot");
                        drop(job);
                        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            }
            RejectionPolicy::Discard => {
                drop(job);
                self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    /// Graceful shutdown: stop accepting work, let workers drain the
    /// queue and terminate. Idempotent, non-blocking.
    pub fn shutdown(&self) {
        let previous = self.shared.advance_lifecycle(Lifecycle::ShuttingDown);
        if previous != Lifecycle::Running {
            return;
        }
        tracing::info!(
            pool = %self.name,
            queued = self.shared.queue.len(),
            "graceful shutdown requested"
        );
        // Workers observe the disconnect once the remaining buffer is
        // drained.
        self.shared.queue.close();
    }

    /// Forceful shutdown: discard queued work and abort blocked takes.
    /// Running tasks are not preempted; cooperative tasks can poll
    /// [`is_shutdown_now`](ThreadPool::is_shutdown_now). Idempotent,
    /// non-blocking.
    pub fn shutdown_now(&self) {
        let previous = self.shared.advance_lifecycle(Lifecycle::Stopping);
        if previous == Lifecycle::Stopping {
            return;
        }
        let dropped = self.shared.queue.drain();
        self.shared.in_flight.fetch_sub(dropped, Ordering::SeqCst);
        self.shared.queue.close();
        tracing::info!(pool = %self.name, dropped, "forceful shutdown requested");
    }

    /// Whether any shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shared.lifecycle() != Lifecycle::Running
    }

    /// Whether a forceful shutdown has been requested.
    pub fn is_shutdown_now(&self) -> bool {
        self.shared.lifecycle() == Lifecycle::Stopping
    }

    /// Block until every worker has terminated.
    pub fn await_termination(&self) {
        let mut registry = self.shared.registry.lock().unwrap();
        while !registry.is_empty() {
            registry = self.shared.terminated.wait(registry).unwrap();
        }
    }

    /// Bounded wait; returns `true` once all workers terminated in time.
    pub fn await_termination_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut registry = self.shared.registry.lock().unwrap();
        while !registry.is_empty() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, _) = self
                .shared
                .terminated
                .wait_timeout(registry, remaining)
                .unwrap();
            registry = guard;
        }
        true
    }

    /// Pool name, shared with worker thread names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured core worker count.
    #[inline]
    pub fn core_threads(&self) -> usize {
        self.core_threads
    }

    /// Configured maximum worker count.
    #[inline]
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Configured idle keep-alive, used as the workers' take timeout.
    #[inline]
    pub fn keep_alive(&self) -> Duration {
        self.shared.keep_alive
    }

    /// Configured queue capacity.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Current live worker count. Best-effort gauge under concurrent
    /// growth and retirement.
    pub fn worker_count(&self) -> usize {
        self.shared.worker_count()
    }

    /// Workers currently blocked waiting for a task.
    pub fn idle_workers(&self) -> usize {
        self.shared.idle_workers.load(Ordering::SeqCst)
    }

    /// Tasks waiting in the queue.
    pub fn queued_tasks(&self) -> usize {
        self.shared.queue.len()
    }

    /// Accepted tasks that have not finished yet. Observability only,
    /// never used for admission control.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }
}

impl Executor for ThreadPool {
    fn execute_job(&self, job: Job) -> PoolResult<()> {
        self.admit(job)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
