//! Worker loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::RecvTimeoutError;

use crate::error::panic_message;

use super::controller::{Lifecycle, Shared};
use super::Job;

/// A loop bound to one worker thread.
///
/// Alternates between blocking on the queue (bounded by the keep-alive)
/// and running the task it retrieved. Terminates when the pool shuts
/// down, or when it times out while the pool is above its core size.
/// Always deregisters itself from the registry on the way out.
pub(crate) struct Worker {
    id: usize,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(id: usize, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    pub(crate) fn run(self) {
        tracing::debug!(worker = self.id, "worker started");

        loop {
            if self.shared.lifecycle() == Lifecycle::Stopping {
                break;
            }

            self.shared.idle_workers.fetch_add(1, Ordering::SeqCst);
            let taken = self.shared.queue.poll(self.shared.keep_alive);
            self.shared.idle_workers.fetch_sub(1, Ordering::SeqCst);

            match taken {
                Ok(job) => {
                    if self.shared.lifecycle() == Lifecycle::Stopping {
                        // Raced with a forceful drain; the job counts as cleared.
                        drop(job);
                        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                        break;
                    }
                    self.run_job(job);
                    self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.shared.lifecycle() >= Lifecycle::ShuttingDown
                        && self.shared.queue.is_empty()
                    {
                        break;
                    }
                    if self.shared.retire_if_excess(self.id) {
                        tracing::debug!(worker = self.id, "idle past keep-alive, retiring");
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.shared.deregister(self.id);
        tracing::debug!(worker = self.id, "worker stopped");
    }

    /// Run one task inside a fault boundary.
    ///
    /// A panicking task must not take the worker thread down with it;
    /// result-bearing tasks report their panic through the handle, so
    /// only fire-and-forget panics surface here.
    fn run_job(&self, job: Job) {
        tracing::trace!(worker = self.id, "task started");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            tracing::error!(
                worker = self.id,
                panic = %panic_message(payload.as_ref()),
                "task panicked"
            );
        }
    }
}
