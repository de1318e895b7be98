//! The task contract consumed by [`TaskPool`](crate::core::TaskPool).

use std::sync::Arc;

use async_trait::async_trait;

use super::TaskError;

/// A unit of schedulable background work, owned by the caller.
///
/// The pool never constructs or destroys tasks. It only tracks which ones are
/// running, and it does so by reference identity: two distinct `Arc`s are two
/// distinct tasks even if they describe the same business record.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use weighted_task_pool::core::{PoolTask, TaskError};
///
/// struct ReindexJob {
///     id: String,
///     deadline_ms: u128,
/// }
///
/// #[async_trait]
/// impl PoolTask for ReindexJob {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn cost(&self) -> u32 {
///         2
///     }
///
///     fn is_expired(&self) -> bool {
///         weighted_task_pool::util::now_ms() > self.deadline_ms
///     }
///
///     async fn claim_ownership(&self) -> Result<bool, TaskError> {
///         // e.g. UPDATE jobs SET owner = $1, version = version + 1
///         //      WHERE id = $2 AND version = $3
///         Ok(true)
///     }
///
///     async fn run(&self) -> Result<(), TaskError> {
///         Ok(())
///     }
///
///     async fn cancel(&self) -> Result<(), TaskError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait PoolTask: Send + Sync + 'static {
    /// Identity used in logs and audit events. Not used for deduplication.
    fn id(&self) -> String;

    /// Worker slots occupied while running. Expected to be at least 1.
    fn cost(&self) -> u32;

    /// True once the task's deadline has passed.
    fn is_expired(&self) -> bool;

    /// Atomically acquire exclusive execution rights.
    ///
    /// `Ok(false)` means another owner won the race or the task no longer
    /// exists. Implementations shared by several pools must make this a
    /// compare-and-set against an external authority, not a local lock.
    async fn claim_ownership(&self) -> Result<bool, TaskError>;

    /// Perform the work. The pool spawns this and never awaits it inline.
    async fn run(&self) -> Result<(), TaskError>;

    /// Best-effort forced stop, requested when the task has expired.
    async fn cancel(&self) -> Result<(), TaskError>;
}

/// Shared handle the pool stores in its running set.
pub type TaskHandle = Arc<dyn PoolTask>;

/// Pointer identity of a task handle.
pub(crate) fn task_key(task: &TaskHandle) -> usize {
    Arc::as_ptr(task).cast::<()>() as usize
}
