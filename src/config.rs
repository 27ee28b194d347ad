//! Pool configuration.
//!
//! Configuration is immutable after construction and validated eagerly:
//! a pool is never started with inconsistent sizes. Values come from the
//! builder, with optional environment overrides via
//! [`PoolConfigBuilder::from_env`].
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
//! let pool = ThreadPool::new(config);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::factory::{NamedThreadFactory, ThreadFactory};
use crate::policy::RejectionPolicy;

/// Default keep-alive for excess (above-core) workers.
const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Queue slots per core worker when no capacity is given.
const DEFAULT_QUEUE_MULTIPLIER: usize = 100;

/// Default pool name used for worker thread naming.
const DEFAULT_POOL_NAME: &str = "taskpool";

/// Validated, immutable pool configuration.
#[derive(Clone)]
pub struct PoolConfig {
    core_threads: usize,
    max_threads: usize,
    keep_alive: Duration,
    queue_capacity: usize,
    min_spare_threads: usize,
    rejection_policy: RejectionPolicy,
    thread_factory: Arc<dyn ThreadFactory>,
}

impl PoolConfig {
    /// Get a builder with defaults derived from the CPU count.
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// Minimum number of workers kept alive regardless of load.
    #[inline]
    pub fn core_threads(&self) -> usize {
        self.core_threads
    }

    /// Hard upper bound on simultaneously live workers.
    #[inline]
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Idle time after which an excess worker may retire.
    #[inline]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Fixed task queue capacity. Zero means direct handoff.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Idle workers kept in reserve to absorb bursts.
    #[inline]
    pub fn min_spare_threads(&self) -> usize {
        self.min_spare_threads
    }

    /// Strategy applied when queue and workers are both saturated.
    #[inline]
    pub fn rejection_policy(&self) -> RejectionPolicy {
        self.rejection_policy
    }

    /// Factory used to create worker threads.
    #[inline]
    pub fn thread_factory(&self) -> Arc<dyn ThreadFactory> {
        Arc::clone(&self.thread_factory)
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("core_threads", &self.core_threads)
            .field("max_threads", &self.max_threads)
            .field("keep_alive", &self.keep_alive)
            .field("queue_capacity", &self.queue_capacity)
            .field("min_spare_threads", &self.min_spare_threads)
            .field("rejection_policy", &self.rejection_policy)
            .field("pool_name", &self.thread_factory.pool_name())
            .finish()
    }
}

/// Builder for [`PoolConfig`].
pub struct PoolConfigBuilder {
    core_threads: Option<usize>,
    max_threads: Option<usize>,
    keep_alive: Duration,
    queue_capacity: Option<usize>,
    min_spare_threads: usize,
    rejection_policy: RejectionPolicy,
    thread_factory: Option<Arc<dyn ThreadFactory>>,
}

impl Default for PoolConfigBuilder {
    fn default() -> Self {
        Self {
            core_threads: None,
            max_threads: None,
            keep_alive: DEFAULT_KEEP_ALIVE,
            queue_capacity: None,
            min_spare_threads: 0,
            rejection_policy: RejectionPolicy::default(),
            thread_factory: None,
        }
    }
}

impl PoolConfigBuilder {
    /// Set the core worker count. Must be positive.
    pub fn core_threads(mut self, count: usize) -> Self {
        self.core_threads = Some(count);
        self
    }

    /// Set the maximum worker count. Must be at least the core count.
    pub fn max_threads(mut self, count: usize) -> Self {
        self.max_threads = Some(count);
        self
    }

    /// Set the idle keep-alive for excess workers.
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Set the task queue capacity. Zero disables queueing (direct handoff).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the minimum number of idle workers to keep in reserve.
    pub fn min_spare_threads(mut self, count: usize) -> Self {
        self.min_spare_threads = count;
        self
    }

    /// Set the overload rejection policy.
    pub fn rejection_policy(mut self, policy: RejectionPolicy) -> Self {
        self.rejection_policy = policy;
        self
    }

    /// Set the worker thread factory.
    pub fn thread_factory(mut self, factory: Arc<dyn ThreadFactory>) -> Self {
        self.thread_factory = Some(factory);
        self
    }

    /// Load overrides from `TASKPOOL_*` environment variables.
    ///
    /// Recognized keys: `TASKPOOL_CORE_THREADS` (`0` resolves to the CPU
    /// count), `TASKPOOL_MAX_THREADS`, `TASKPOOL_KEEP_ALIVE` (`30s`, `2m`,
    /// `1h` or plain seconds), `TASKPOOL_QUEUE_CAPACITY`,
    /// `TASKPOOL_MIN_SPARE_THREADS`, `TASKPOOL_REJECTION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(core) = env_usize("TASKPOOL_CORE_THREADS")? {
            // 0 resolves to the CPU count
            let core = if core == 0 { num_cpus::get() } else { core };
            builder.core_threads = Some(core);
        }
        if let Some(max) = env_usize("TASKPOOL_MAX_THREADS")? {
            if max > 0 {
                builder.max_threads = Some(max);
            }
        }
        if let Some(capacity) = env_usize("TASKPOOL_QUEUE_CAPACITY")? {
            builder.queue_capacity = Some(capacity);
        }
        if let Some(spare) = env_usize("TASKPOOL_MIN_SPARE_THREADS")? {
            builder.min_spare_threads = spare;
        }
        if let Some(raw) = env_opt("TASKPOOL_KEEP_ALIVE") {
            builder.keep_alive =
                parse_duration(&raw).map_err(|error| ConfigError::Parse {
                    key: "TASKPOOL_KEEP_ALIVE".into(),
                    value: raw,
                    error,
                })?;
        }
        if let Some(raw) = env_opt("TASKPOOL_REJECTION") {
            builder.rejection_policy =
                RejectionPolicy::from_str(&raw).map_err(|error| ConfigError::Parse {
                    key: "TASKPOOL_REJECTION".into(),
                    value: raw,
                    error,
                })?;
        }

        Ok(builder)
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<PoolConfig, ConfigError> {
        let core_threads = self.core_threads.unwrap_or_else(num_cpus::get);
        if core_threads == 0 {
            return Err(ConfigError::Invalid {
                key: "core_threads".into(),
                message: "core thread count must be positive".into(),
            });
        }

        let max_threads = self.max_threads.unwrap_or(core_threads * 2);
        if max_threads < core_threads {
            return Err(ConfigError::Invalid {
                key: "max_threads".into(),
                message: format!(
                    "maximum thread count {} is below core thread count {}",
                    max_threads, core_threads
                ),
            });
        }

        let queue_capacity = self
            .queue_capacity
            .unwrap_or(core_threads * DEFAULT_QUEUE_MULTIPLIER);

        let thread_factory = self
            .thread_factory
            .unwrap_or_else(|| Arc::new(NamedThreadFactory::new(DEFAULT_POOL_NAME)));

        Ok(PoolConfig {
            core_threads,
            max_threads,
            keep_alive: self.keep_alive,
            queue_capacity,
            min_spare_threads: self.min_spare_threads,
            rejection_policy: self.rejection_policy,
            thread_factory,
        })
    }
}

/// Get optional environment variable (None if empty or missing).
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse an optional environment variable as usize.
fn env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: std::num::ParseIntError| ConfigError::Parse {
                key: key.into(),
                value: raw,
                error: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Parse a duration string (e.g. `30s`, `2m`, `1h`, plain seconds).
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    if s == "0" || s == "off" {
        return Ok(Duration::ZERO);
    }

    let (num_str, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        return rest
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| format!("invalid duration: {}", s));
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3600)
    } else {
        // Plain number of seconds
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;

    Ok(Duration::from_secs(num * multiplier))
}
