//! Core admission control: the pool, the task contract, and capacity accounting.

pub mod audit;
pub mod error;
pub mod stats;
pub mod task;
pub mod task_pool;

pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, PoolError, TaskError};
pub use stats::PoolStats;
pub use task::{PoolTask, TaskHandle};
pub use task_pool::{AdmissionReport, Blocked, PoolLimits, Spawn, TaskPool};
