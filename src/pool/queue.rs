//! Bounded FIFO task queue.

use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use super::Job;

/// Fixed-capacity FIFO shared by submitters and workers.
///
/// Producers use the non-blocking [`offer`](TaskQueue::offer); workers
/// block in [`poll`](TaskQueue::poll) with a timeout. The sender half
/// lives behind a mutex so shutdown can drop it: once dropped, blocked
/// polls drain the remaining buffer and then observe a disconnect.
///
/// A capacity of zero turns the queue into a direct handoff: an offer
/// only succeeds while a worker is already waiting in `poll`.
pub(crate) struct TaskQueue {
    tx: Mutex<Option<Sender<Job>>>,
    rx: Receiver<Job>,
    capacity: usize,
}

impl TaskQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
            capacity,
        }
    }

    /// Non-blocking enqueue. Returns the job back on a full or closed queue.
    pub(crate) fn offer(&self, job: Job) -> Result<(), Job> {
        let guard = self.tx.lock().unwrap();
        match guard.as_ref() {
            Some(tx) => match tx.try_send(job) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(job)) | Err(TrySendError::Disconnected(job)) => Err(job),
            },
            None => Err(job),
        }
    }

    /// Blocking take, bounded by `timeout`.
    pub(crate) fn poll(&self, timeout: Duration) -> Result<Job, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Remove and return the oldest pending job, if any.
    pub(crate) fn evict_oldest(&self) -> Option<Job> {
        self.rx.try_recv().ok()
    }

    /// Discard all pending jobs, returning how many were dropped.
    pub(crate) fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Close the queue. Blocked polls fail once the buffer is empty.
    /// Idempotent.
    pub(crate) fn close(&self) {
        self.tx.lock().unwrap().take();
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}
