//! Overload rejection policies.
//!
//! A policy is selected once at pool construction and applied whenever a
//! submission finds the queue full and the worker count at its maximum.
//! The set is closed: call sites match exhaustively.

use std::str::FromStr;

/// Strategy applied when no queue slot and no worker slot is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectionPolicy {
    /// Fail the submission with [`PoolError::Rejected`]; the task never runs.
    ///
    /// [`PoolError::Rejected`]: crate::error::PoolError::Rejected
    #[default]
    Abort,

    /// Execute the task synchronously on the submitting thread. The
    /// submission call does not return until the task completes.
    CallerRuns,

    /// Evict the oldest pending queue entry, then enqueue the new task.
    DiscardOldest,

    /// Silently drop the new task; the submission reports success.
    Discard,
}

impl RejectionPolicy {
    /// Stable lowercase name, used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionPolicy::Abort => "abort",
            RejectionPolicy::CallerRuns => "caller-runs",
            RejectionPolicy::DiscardOldest => "discard-oldest",
            RejectionPolicy::Discard => "discard",
        }
    }
}

impl FromStr for RejectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(RejectionPolicy::Abort),
            "caller-runs" | "caller_runs" => Ok(RejectionPolicy::CallerRuns),
            "discard-oldest" | "discard_oldest" => Ok(RejectionPolicy::DiscardOldest),
            "discard" => Ok(RejectionPolicy::Discard),
            other => Err(format!("unknown rejection policy: {}", other)),
        }
    }
}
