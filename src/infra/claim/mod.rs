//! Ownership claims with optimistic concurrency.
//!
//! A [`ClaimStore`] is the external authority behind
//! [`PoolTask::claim_ownership`](crate::core::PoolTask::claim_ownership). Every
//! record carries a version; a claim succeeds only if the record is unowned and
//! still at the version the claimer read, so two pools racing for the same task
//! cannot both win.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::core::TaskError;

pub use memory::InMemoryClaimStore;

/// Ownership state of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Current owner, if claimed.
    pub owner: Option<String>,
    /// Bumped on every successful claim or release.
    pub version: u64,
    /// When the current owner claimed it (ms since epoch).
    pub claimed_at_ms: Option<u128>,
}

/// Abstraction for claim backends.
pub trait ClaimStore: Send + Sync {
    /// Current record for a task, or `None` if the task no longer exists.
    fn record(&self, task_id: &str) -> Option<ClaimRecord>;

    /// Claim `task_id` for `owner` if it is unowned and still at
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Backend failures. A lost race is `Ok(false)`, not an error.
    fn try_claim(&self, task_id: &str, owner: &str, expected_version: u64)
        -> Result<bool, TaskError>;

    /// Give up ownership. Returns `Ok(false)` if `owner` does not hold it.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn release(&self, task_id: &str, owner: &str) -> Result<bool, TaskError>;

    /// Read the current version and claim against it.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn claim(&self, task_id: &str, owner: &str) -> Result<bool, TaskError> {
        match self.record(task_id) {
            Some(record) if record.owner.is_none() => {
                self.try_claim(task_id, owner, record.version)
            }
            _ => Ok(false),
        }
    }
}
