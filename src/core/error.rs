//! Error types for pool and task operations.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the pool itself: configuration problems and admission
/// rejections reported through [`crate::core::AdmissionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Not enough free worker slots for the candidate right now.
    #[error("insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity {
        /// Slots requested by the candidate.
        requested: u32,
        /// Slots free at the time of the check.
        available: u32,
    },
    /// The candidate can never fit, even into an empty pool.
    #[error("task cost {cost} exceeds pool capacity {capacity}")]
    CostExceedsCapacity {
        /// Declared cost of the candidate.
        cost: u32,
        /// Total capacity of the pool.
        capacity: u32,
    },
    /// The candidate declared a cost of zero; every task needs at least one slot.
    #[error("task cost must be at least 1")]
    ZeroCost,
}

/// Errors raised by task implementations. The pool logs and discards them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task's own work failed.
    #[error("task failed: {0}")]
    Failed(String),
    /// The claim backend could not be reached or answered with an error.
    #[error("claim error: {0}")]
    Claim(String),
    /// Forced cancellation failed.
    #[error("cancel failed: {0}")]
    Cancel(String),
    /// An operation did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl TaskError {
    /// Short stable label for logs and metrics.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Failed(_) => "task_failed",
            Self::Claim(_) => "task_claim",
            Self::Cancel(_) => "task_cancel",
            Self::Timeout(_) => "task_timeout",
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
