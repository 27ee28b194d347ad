//! Bounded worker pool.
//!
//! This module provides a dynamically sized thread pool with a
//! fixed-capacity task queue and explicit overload policies.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ThreadPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │              ┌───────────────┐                             │
//! │              │ execute/submit│  (admission + rejection)    │
//! │              └───────┬───────┘                             │
//! │                      │                                     │
//! │              ┌───────▼───────┐                             │
//! │              │ bounded queue │  (crossbeam channel)        │
//! │              └───────┬───────┘                             │
//! │                      │                                     │
//! │       ┌──────────────┴──────────────┐                      │
//! │       │              │              │                      │
//! │  ┌────▼────┐    ┌────▼────┐    ┌────▼────┐                 │
//! │  │ Worker1 │    │ Worker2 │    │ Worker3 │  ...            │
//! │  └─────────┘    └─────────┘    └─────────┘                 │
//! │   core..max workers, grown on demand, retired on idle      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Workers are created eagerly up to the core count, grown on queue
//! pressure up to the maximum, and retired after `keep_alive` of
//! idleness once above the core count. When both the queue and the
//! worker set are saturated, the configured [`RejectionPolicy`] decides
//! what happens to the new task.
//!
//! [`RejectionPolicy`]: crate::policy::RejectionPolicy

mod controller;
mod queue;
mod worker;

pub use controller::ThreadPool;

use crate::error::PoolResult;

/// A unit of work accepted by the pool. Opaque to the pool itself.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Object-safe execution facility.
///
/// Collaborators that only need "accept a unit of work, run it
/// asynchronously" can hold an `Arc<dyn Executor>` instead of the
/// concrete pool type. No ordering guarantee beyond per-submission FIFO
/// admission is implied.
pub trait Executor: Send + Sync {
    /// Submit a job for asynchronous execution.
    fn execute_job(&self, job: Job) -> PoolResult<()>;
}
