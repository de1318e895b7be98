//! Cost-weighted admission pool.
//!
//! A [`TaskPool`] owns a fixed number of worker slots and the set of tasks
//! currently holding them. Each call to [`TaskPool::run`] is one scheduling
//! pass:
//!
//! 1. running tasks whose deadline passed are removed, and their
//!    cancellation is spawned without being awaited;
//! 2. candidates are offered strictly in the order given. The first one that
//!    does not fit into the free slots stops the pass, and nothing after it
//!    is looked at. A candidate that fits but loses its claim is skipped and
//!    the pass continues.
//!
//! Admitted tasks are spawned and never awaited. Their completion removes them
//! from the running set; errors are logged and dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::core::audit::{AuditAction, AuditEvent, AuditSink};
use crate::core::stats::{PoolCounters, PoolStats};
use crate::core::task::{task_key, TaskHandle};
use crate::core::{PoolError, TaskError};
use crate::runtime::TokioSpawner;

/// Abstraction for spawning fire-and-forget futures on a runtime.
pub trait Spawn {
    /// Spawn a future; the caller does not wait for it.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Capacity limits for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Total worker slots.
    pub capacity: u32,
    /// Upper bound on a single `cancel()` call during reaping.
    pub cancel_timeout: Duration,
}

impl PoolLimits {
    /// Cancel timeout used when none is configured.
    pub const DEFAULT_CANCEL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Limits with the given capacity and the default cancel timeout.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cancel_timeout: Self::DEFAULT_CANCEL_TIMEOUT,
        }
    }

    /// Override the cancel timeout.
    #[must_use]
    pub const fn with_cancel_timeout(mut self, cancel_timeout: Duration) -> Self {
        self.cancel_timeout = cancel_timeout;
        self
    }
}

/// The candidate that stopped an admission pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocked {
    /// Position of the candidate in the offered batch.
    pub index: usize,
    /// Identity of the candidate.
    pub task_id: String,
    /// Why it could not be admitted.
    pub reason: PoolError,
}

/// Outcome of one admission pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    /// Expired tasks evicted at the start of the pass.
    pub reaped: usize,
    /// Candidates claimed and started.
    pub admitted: usize,
    /// Candidates skipped because the claim was lost or they were already running.
    pub claim_conflicts: usize,
    /// Set when a candidate did not fit; later candidates were not evaluated.
    pub blocked: Option<Blocked>,
}

impl AdmissionReport {
    /// True when no candidate was rejected for lack of capacity.
    #[must_use]
    pub const fn all_offered(&self) -> bool {
        self.blocked.is_none()
    }
}

struct RunningEntry {
    task: TaskHandle,
    cost: u32,
    admission: u64,
}

/// Running tasks keyed by pointer identity.
#[derive(Default)]
struct RunningSet {
    entries: HashMap<usize, RunningEntry>,
    next_admission: u64,
}

impl RunningSet {
    fn occupied(&self) -> u32 {
        self.entries.values().map(|e| e.cost).sum()
    }

    /// Remove `key` only if it still belongs to `admission`. A task that was
    /// reaped and then admitted again must not be evicted by the first run's
    /// late completion.
    fn finish(&mut self, key: usize, admission: u64) -> bool {
        self.take(key, admission).is_some()
    }

    fn take(&mut self, key: usize, admission: u64) -> Option<RunningEntry> {
        match self.entries.get(&key) {
            Some(entry) if entry.admission == admission => self.entries.remove(&key),
            _ => None,
        }
    }
}

/// State shared with spawned completions.
struct PoolShared {
    name: String,
    running: Mutex<RunningSet>,
    counters: PoolCounters,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PoolShared {
    fn audit(&self, task_id: &str, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = &self.audit {
            sink.record(AuditEvent::new(task_id, self.name.as_str(), action, detail));
        }
    }
}

/// Releases the slot if the run future is dropped before it completes, e.g.
/// because the task panicked or the runtime shut down.
struct SlotGuard {
    shared: Arc<PoolShared>,
    key: usize,
    admission: u64,
    armed: bool,
}

impl SlotGuard {
    fn finish(mut self) -> bool {
        self.armed = false;
        self.shared.running.lock().finish(self.key, self.admission)
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.armed && self.shared.running.lock().finish(self.key, self.admission) {
            PoolCounters::bump(&self.shared.counters.failed);
            warn!(pool = %self.shared.name, "task run dropped before completion; slot released");
        }
    }
}

/// Cost-weighted concurrency admission controller.
///
/// `sum(cost of running tasks) <= capacity` holds after every pass. Passes on
/// the same pool are serialized; completions may release slots at any time.
pub struct TaskPool<S = TokioSpawner> {
    limits: PoolLimits,
    shared: Arc<PoolShared>,
    pass: tokio::sync::Mutex<()>,
    spawner: S,
}

impl<S> TaskPool<S> {
    /// Create a pool. `limits.capacity` is fixed for the pool's lifetime.
    pub fn new(name: impl Into<String>, limits: PoolLimits, spawner: S) -> Self {
        Self::build(name.into(), limits, spawner, None)
    }

    /// Create a pool reporting decisions to `audit`.
    pub fn with_audit(
        name: impl Into<String>,
        limits: PoolLimits,
        spawner: S,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self::build(name.into(), limits, spawner, Some(audit))
    }

    fn build(
        name: String,
        limits: PoolLimits,
        spawner: S,
        audit: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        debug!(pool = %name, capacity = limits.capacity, "task pool created");
        Self {
            limits,
            shared: Arc::new(PoolShared {
                name,
                running: Mutex::new(RunningSet::default()),
                counters: PoolCounters::default(),
                audit,
            }),
            pass: tokio::sync::Mutex::new(()),
            spawner,
        }
    }

    /// Pool name used in logs and audit events.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Configured limits.
    pub const fn limits(&self) -> PoolLimits {
        self.limits
    }

    /// Total worker slots.
    pub const fn capacity(&self) -> u32 {
        self.limits.capacity
    }

    /// Slots held by running tasks.
    pub fn occupied_workers(&self) -> u32 {
        self.shared.running.lock().occupied()
    }

    /// Free slots. Callers may use this to size their next fetch of due tasks.
    pub fn available_workers(&self) -> u32 {
        self.limits.capacity.saturating_sub(self.occupied_workers())
    }

    /// Number of running tasks.
    pub fn running_tasks(&self) -> usize {
        self.shared.running.lock().entries.len()
    }

    /// Whether this exact task handle is currently running here.
    pub fn is_running(&self, task: &TaskHandle) -> bool {
        self.shared.running.lock().entries.contains_key(&task_key(task))
    }

    /// Utilization and lifetime counters.
    pub fn stats(&self) -> PoolStats {
        let running = self.shared.running.lock();
        self.shared
            .counters
            .snapshot(self.limits.capacity, running.occupied(), running.entries.len())
    }
}

impl<S: Spawn> TaskPool<S> {
    /// Run one scheduling pass. Returns `false` as soon as a candidate does
    /// not fit; candidates admitted before it keep running.
    pub async fn run<I>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = TaskHandle>,
    {
        self.run_batch(candidates).await.all_offered()
    }

    /// Evict expired tasks and spawn their cancellation. `is_expired` is task
    /// code, so it runs without the running-set lock held.
    fn reap_expired(&self) -> usize {
        let snapshot: Vec<(usize, u64, TaskHandle)> = self
            .shared
            .running
            .lock()
            .entries
            .iter()
            .map(|(key, entry)| (*key, entry.admission, Arc::clone(&entry.task)))
            .collect();

        let expired: Vec<(usize, u64)> = snapshot
            .into_iter()
            .filter(|(_, _, task)| task.is_expired())
            .map(|(key, admission, _)| (key, admission))
            .collect();
        if expired.is_empty() {
            return 0;
        }

        // Entries that completed since the snapshot are gone and stay gone.
        let evicted: Vec<RunningEntry> = {
            let mut running = self.shared.running.lock();
            expired
                .into_iter()
                .filter_map(|(key, admission)| running.take(key, admission))
                .collect()
        };

        let reaped = evicted.len();
        for entry in evicted {
            self.cancel_one(entry);
        }
        reaped
    }

    /// The entry is already out of the running set; cancellation runs in the
    /// background, bounded by the cancel timeout.
    fn cancel_one(&self, entry: RunningEntry) {
        let task_id = entry.task.id();
        PoolCounters::bump(&self.shared.counters.expired);
        info!(
            pool = %self.shared.name,
            task = %task_id,
            cost = entry.cost,
            "cancelling expired task"
        );
        self.shared.audit(&task_id, AuditAction::Expired, None);

        let shared = Arc::clone(&self.shared);
        let timeout = self.limits.cancel_timeout;
        self.spawner.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, entry.task.cancel()).await {
                Ok(result) => result,
                Err(_) => Err(TaskError::Timeout(timeout)),
            };

            if let Err(e) = outcome {
                PoolCounters::bump(&shared.counters.cancel_failures);
                error!(
                    pool = %shared.name,
                    task = %task_id,
                    error = %e,
                    label = e.as_label(),
                    "failed to cancel expired task"
                );
            }
        });
    }

    /// Same as [`run`](Self::run), reporting what happened to each group of
    /// candidates.
    pub async fn run_batch<I>(&self, candidates: I) -> AdmissionReport
    where
        I: IntoIterator<Item = TaskHandle>,
    {
        let _pass = self.pass.lock().await;

        let mut report = AdmissionReport {
            reaped: self.reap_expired(),
            ..AdmissionReport::default()
        };

        for (index, task) in candidates.into_iter().enumerate() {
            let cost = task.cost();

            if let Some(reason) = self.check_fit(cost) {
                let task_id = task.id();
                PoolCounters::bump(&self.shared.counters.rejected);
                if matches!(
                    reason,
                    PoolError::CostExceedsCapacity { .. } | PoolError::ZeroCost
                ) {
                    error!(pool = %self.shared.name, task = %task_id, error = %reason, "candidate can never be admitted");
                } else {
                    debug!(pool = %self.shared.name, task = %task_id, error = %reason, "admission stopped");
                }
                self.shared
                    .audit(&task_id, AuditAction::Rejected, Some(reason.to_string()));
                report.blocked = Some(Blocked {
                    index,
                    task_id,
                    reason,
                });
                break;
            }

            if self.is_running(&task) {
                debug!(pool = %self.shared.name, task = %task.id(), "candidate already running");
                self.claim_conflict(&mut report, &task, None);
                continue;
            }

            match task.claim_ownership().await {
                Ok(true) => {
                    self.admit(task, cost);
                    report.admitted += 1;
                }
                Ok(false) => {
                    debug!(pool = %self.shared.name, task = %task.id(), "claim lost");
                    self.claim_conflict(&mut report, &task, None);
                }
                Err(e) => {
                    warn!(
                        pool = %self.shared.name,
                        task = %task.id(),
                        error = %e,
                        label = e.as_label(),
                        "claim failed"
                    );
                    self.claim_conflict(&mut report, &task, Some(e.to_string()));
                }
            }
        }

        report
    }

    fn check_fit(&self, cost: u32) -> Option<PoolError> {
        if cost == 0 {
            return Some(PoolError::ZeroCost);
        }
        let capacity = self.limits.capacity;
        if cost > capacity {
            return Some(PoolError::CostExceedsCapacity { cost, capacity });
        }
        let available = self.available_workers();
        (available < cost).then_some(PoolError::InsufficientCapacity {
            requested: cost,
            available,
        })
    }

    fn claim_conflict(&self, report: &mut AdmissionReport, task: &TaskHandle, detail: Option<String>) {
        report.claim_conflicts += 1;
        PoolCounters::bump(&self.shared.counters.claim_conflicts);
        self.shared.audit(&task.id(), AuditAction::ClaimConflict, detail);
    }

    fn admit(&self, task: TaskHandle, cost: u32) {
        let key = task_key(&task);
        let admission = {
            let mut running = self.shared.running.lock();
            let admission = running.next_admission;
            running.next_admission += 1;
            running.entries.insert(
                key,
                RunningEntry {
                    task: Arc::clone(&task),
                    cost,
                    admission,
                },
            );
            admission
        };

        let task_id = task.id();
        PoolCounters::bump(&self.shared.counters.admitted);
        info!(pool = %self.shared.name, task = %task_id, cost, "task admitted");
        self.shared.audit(&task_id, AuditAction::Admitted, None);

        let guard = SlotGuard {
            shared: Arc::clone(&self.shared),
            key,
            admission,
            armed: true,
        };

        self.spawner.spawn(async move {
            let result = task.run().await;
            let shared = Arc::clone(&guard.shared);
            if !guard.finish() {
                debug!(pool = %shared.name, task = %task_id, "task finished after eviction");
                return;
            }

            match result {
                Ok(()) => {
                    PoolCounters::bump(&shared.counters.completed);
                    debug!(pool = %shared.name, task = %task_id, "task completed");
                    shared.audit(&task_id, AuditAction::Completed, None);
                }
                Err(e) => {
                    PoolCounters::bump(&shared.counters.failed);
                    warn!(
                        pool = %shared.name,
                        task = %task_id,
                        error = %e,
                        label = e.as_label(),
                        "task run failed"
                    );
                    shared.audit(&task_id, AuditAction::Failed, Some(e.to_string()));
                }
            }
        });
    }
}
