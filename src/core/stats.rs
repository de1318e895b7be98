//! Pool statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a pool's utilization and lifetime counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total worker slots.
    pub capacity: u32,
    /// Slots held by running tasks.
    pub occupied_workers: u32,
    /// Number of running tasks.
    pub running_tasks: usize,
    /// Tasks admitted since the pool was created.
    pub admitted: u64,
    /// Tasks whose run finished successfully.
    pub completed: u64,
    /// Tasks whose run returned an error.
    pub failed: u64,
    /// Running tasks evicted because they expired.
    pub expired: u64,
    /// Cancellations that errored or timed out.
    pub cancel_failures: u64,
    /// Candidates skipped because the claim was lost.
    pub claim_conflicts: u64,
    /// Candidates that stopped a batch for lack of capacity.
    pub rejected: u64,
}

/// Lifetime counters shared with spawned completions.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub admitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub expired: AtomicU64,
    pub cancel_failures: AtomicU64,
    pub claim_conflicts: AtomicU64,
    pub rejected: AtomicU64,
}

impl PoolCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Combine counters with the current occupancy.
    pub fn snapshot(&self, capacity: u32, occupied_workers: u32, running_tasks: usize) -> PoolStats {
        PoolStats {
            capacity,
            occupied_workers,
            running_tasks,
            admitted: self.admitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            cancel_failures: self.cancel_failures.load(Ordering::Relaxed),
            claim_conflicts: self.claim_conflicts.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
