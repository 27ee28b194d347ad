//! Worker thread creation.
//!
//! The pool never spawns threads directly; it asks an injected
//! [`ThreadFactory`] so embedders can control naming, stack sizes or
//! instrumentation of worker threads.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// Creates OS threads for pool workers.
///
/// Implementations must be safe to call from multiple threads at once;
/// the pool invokes [`spawn`](ThreadFactory::spawn) from racing growth
/// decisions.
pub trait ThreadFactory: Send + Sync {
    /// Spawn a new thread running `f`, named with a pool-scoped scheme.
    fn spawn(&self, f: Box<dyn FnOnce() + Send + 'static>) -> io::Result<JoinHandle<()>>;

    /// Name shared by all threads this factory creates.
    fn pool_name(&self) -> &str;
}

/// Default factory producing `{pool}-worker-{n}` thread names with a
/// monotonically increasing index.
#[derive(Debug)]
pub struct NamedThreadFactory {
    pool_name: String,
    counter: AtomicUsize,
}

impl NamedThreadFactory {
    pub fn new(pool_name: impl Into<String>) -> Self {
        Self {
            pool_name: pool_name.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl ThreadFactory for NamedThreadFactory {
    fn spawn(&self, f: Box<dyn FnOnce() + Send + 'static>) -> io::Result<JoinHandle<()>> {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!("{}-worker-{}", self.pool_name, index);
        tracing::debug!(thread = %name, "creating worker thread");
        thread::Builder::new().name(name).spawn(move || f())
    }

    fn pool_name(&self) -> &str {
        &self.pool_name
    }
}
