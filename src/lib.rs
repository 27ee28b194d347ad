//! taskpool - Configurable bounded thread pool.
//!
//! This crate provides a thread pool with a fixed-capacity task queue,
//! dynamic worker growth between a core and a maximum count, and
//! explicit, pluggable overload policies.
//!
//! # Features
//!
//! - **Bounded queue**: fixed-capacity FIFO admission; zero capacity
//!   means direct handoff to a waiting worker
//! - **Dynamic sizing**: eager core workers, growth on queue pressure up
//!   to the maximum, keep-alive retirement of excess workers
//! - **Spare-thread reserve**: keeps a configurable margin of idle
//!   workers warm to absorb bursts
//! - **Rejection policies**: `Abort`, `CallerRuns`, `DiscardOldest` and
//!   `Discard`, selected at construction
//! - **Result handles**: [`submit`](pool::ThreadPool::submit) captures a
//!   task's value or panic into a joinable, awaitable [`TaskHandle`]
//! - **Fault isolation**: a panicking task never takes its worker down
//! - **Structured logging**: pool and worker events traced with `tracing`
//!
//! # Example
//!
//! ```rust,ignore
//! use taskpool::{PoolConfig, RejectionPolicy, ThreadPool};
//!
//! let config = PoolConfig::builder()
//!     .core_threads(2)
//!     .max_threads(8)
//!     .queue_capacity(64)
//!     .rejection_policy(RejectionPolicy::CallerRuns)
//!     .build()?;
//!
//! let pool = ThreadPool::new(config);
//!
//! pool.execute(|| println!("fire and forget"))?;
//! let answer = pool.submit(|| 6 * 7)?.join()?;
//!
//! pool.shutdown();
//! pool.await_termination();
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod factory;
pub mod handle;
pub mod policy;
pub mod pool;

// Re-exports for convenience
pub use config::{PoolConfig, PoolConfigBuilder};
pub use error::{ConfigError, PoolError, PoolResult};
pub use factory::{NamedThreadFactory, ThreadFactory};
pub use handle::TaskHandle;
pub use policy::RejectionPolicy;
pub use pool::{Executor, Job, ThreadPool};
