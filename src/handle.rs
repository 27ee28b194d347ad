//! Result handles for submitted tasks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::{PoolError, PoolResult};

/// Handle resolving to a submitted task's outcome.
///
/// Returned by [`ThreadPool::submit`]. The handle resolves to the task's
/// return value, to [`PoolError::TaskPanicked`] if the task panicked, or
/// to [`PoolError::Discarded`] if the task was dropped before it could
/// run (discard policies, forceful shutdown).
///
/// Synchronous callers block with [`join`](TaskHandle::join); async
/// callers can simply `.await` the handle.
///
/// [`ThreadPool::submit`]: crate::pool::ThreadPool::submit
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<PoolResult<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(rx: oneshot::Receiver<PoolResult<T>>) -> Self {
        Self { rx }
    }

    /// Block the current thread until the task completes.
    pub fn join(self) -> PoolResult<T> {
        match self.rx.blocking_recv() {
            Ok(result) => result,
            Err(_) => Err(PoolError::Discarded),
        }
    }

    /// Non-blocking completion check.
    ///
    /// Returns `None` while the task is still pending. Once this returns
    /// `Some`, subsequent calls report the task as discarded.
    pub fn try_join(&mut self) -> Option<PoolResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(PoolError::Discarded)),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").finish_non_exhaustive()
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = PoolResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let rx = &mut self.get_mut().rx;
        match Pin::new(rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PoolError::Discarded)),
            Poll::Pending => Poll::Pending,
        }
    }
}
