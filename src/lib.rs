//! # Weighted Task Pool
//!
//! Cost-weighted admission control for background work.
//!
//! A scheduler loop (yours) periodically gathers tasks that are due and hands
//! them to a [`TaskPool`](core::TaskPool). The pool decides which of them may
//! start right now without exceeding a fixed number of weighted worker slots,
//! and evicts running tasks whose deadline has passed. It does not decide what
//! work exists or when it is due.
//!
//! ## Key Features
//!
//! - **Weighted slots**: a task occupies `cost` slots while it runs
//! - **Ordered admission**: candidates are offered in the order given; the first
//!   one that does not fit ends the pass
//! - **Cluster-safe claiming**: admission goes through the task's own atomic
//!   claim, so several pools can share one backlog
//! - **Reaping**: expired tasks are cancelled at the start of every pass and
//!   their slots freed immediately, whether or not cancel succeeds
//! - **Never blocks on work**: runs are spawned; failures are logged, not returned
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use weighted_task_pool::core::{PoolLimits, TaskHandle, TaskPool};
//! use weighted_task_pool::runtime::TokioSpawner;
//!
//! let pool = TaskPool::new("reports", PoolLimits::new(4), TokioSpawner::try_current()?);
//!
//! loop {
//!     let due: Vec<TaskHandle> = fetch_due_tasks(pool.available_workers()).await?;
//!     if !pool.run(due).await {
//!         tracing::debug!("pool saturated, waiting for the next tick");
//!     }
//!     tokio::time::sleep(tick).await;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Builders to construct pools from configuration.
pub mod builders;
/// Configuration models for pools and limits.
pub mod config;
/// Core admission control and the task contract.
pub mod core;
/// Infrastructure adapters (claim stores).
pub mod infra;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
