//! Pool and configuration error types.

use std::any::Any;
use std::fmt;

/// Errors surfaced on the submission path.
#[derive(Debug, Clone)]
pub enum PoolError {
    /// Submission attempted after shutdown was requested.
    Closed,

    /// The `Abort` rejection policy fired under overload.
    Rejected {
        /// Configured queue capacity at the time of rejection.
        capacity: usize,
        /// Live worker count at the time of rejection.
        workers: usize,
    },

    /// The task panicked while running.
    TaskPanicked(String),

    /// The task was dropped before it could run (discarded by policy or
    /// cleared during forceful shutdown).
    Discarded,
}

impl PoolError {
    /// Check if this is a closed-pool error.
    pub fn is_closed(&self) -> bool {
        matches!(self, PoolError::Closed)
    }

    /// Check if this is an overload rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PoolError::Rejected { .. })
    }

    /// Check if this is a captured task panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, PoolError::TaskPanicked(_))
    }

    /// Check if the task was discarded before running.
    pub fn is_discarded(&self) -> bool {
        matches!(self, PoolError::Discarded)
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Closed => {
                write!(f, "pool has been shut down")
            }
            PoolError::Rejected { capacity, workers } => {
                write!(
                    f,
                    "task rejected: queue full ({} slots), {} workers at maximum",
                    capacity, workers
                )
            }
            PoolError::TaskPanicked(msg) => {
                write!(f, "task panicked: {}", msg)
            }
            PoolError::Discarded => {
                write!(f, "task was discarded before it could run")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Error type for pool configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse a configuration value.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Invalid configuration value.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Extract a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
