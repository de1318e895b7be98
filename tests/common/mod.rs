//! Shared test doubles for pool integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use weighted_task_pool::core::{PoolTask, Spawn, TaskError, TaskHandle};

// Simple tokio spawner for tests
#[derive(Clone)]
pub struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

/// How `cancel()` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    Succeed,
    Fail,
    Hang,
}

/// A task whose run blocks until `finish()` (or a releasing cancel), with
/// scripted claim, run and cancel outcomes.
pub struct ScriptedTask {
    id: String,
    cost: u32,
    expired: AtomicBool,
    claim_result: Result<bool, TaskError>,
    run_result: Result<(), TaskError>,
    cancel_mode: CancelMode,
    cancel_releases_run: bool,
    gate: Semaphore,
    pub claims: AtomicUsize,
    pub runs: AtomicUsize,
    pub cancels: AtomicUsize,
}

impl ScriptedTask {
    pub fn new(id: &str, cost: u32) -> Self {
        Self {
            id: id.to_string(),
            cost,
            expired: AtomicBool::new(false),
            claim_result: Ok(true),
            run_result: Ok(()),
            cancel_mode: CancelMode::Succeed,
            cancel_releases_run: true,
            gate: Semaphore::new(0),
            claims: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn claim_result(mut self, result: Result<bool, TaskError>) -> Self {
        self.claim_result = result;
        self
    }

    pub fn run_result(mut self, result: Result<(), TaskError>) -> Self {
        self.run_result = result;
        self
    }

    pub fn cancel_mode(mut self, mode: CancelMode) -> Self {
        self.cancel_mode = mode;
        self
    }

    pub fn cancel_keeps_running(mut self) -> Self {
        self.cancel_releases_run = false;
        self
    }

    /// Wrap into the concrete handle and the pool-facing handle (same allocation).
    pub fn into_handles(self) -> (Arc<Self>, TaskHandle) {
        let task = Arc::new(self);
        let handle: TaskHandle = task.clone();
        (task, handle)
    }

    pub fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    pub fn unexpire(&self) {
        self.expired.store(false, Ordering::SeqCst);
    }

    /// Let one pending `run()` return.
    pub fn finish(&self) {
        self.gate.add_permits(1);
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolTask for ScriptedTask {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn cost(&self) -> u32 {
        self.cost
    }

    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    async fn claim_ownership(&self) -> Result<bool, TaskError> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        // Simulate a remote claim write so concurrent passes interleave.
        tokio::task::yield_now().await;
        self.claim_result.clone()
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.run_result.clone()
    }

    async fn cancel(&self) -> Result<(), TaskError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.cancel_releases_run {
            self.gate.add_permits(1);
        }
        match self.cancel_mode {
            CancelMode::Succeed => Ok(()),
            CancelMode::Fail => Err(TaskError::Cancel("worker unreachable".into())),
            CancelMode::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

/// Build `n` plain tasks with the given costs.
pub fn tasks(costs: &[u32]) -> Vec<(Arc<ScriptedTask>, TaskHandle)> {
    costs
        .iter()
        .enumerate()
        .map(|(i, cost)| ScriptedTask::new(&format!("task-{i}"), *cost).into_handles())
        .collect()
}

pub fn handles(tasks: &[(Arc<ScriptedTask>, TaskHandle)]) -> Vec<TaskHandle> {
    tasks.iter().map(|(_, h)| h.clone()).collect()
}

/// Poll until `cond` holds, giving spawned runs a chance to progress.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 2s");
}
