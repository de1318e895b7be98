//! Configuration models for pools and their limits.

pub mod pool;

pub use pool::{PoolConfig, SchedulerConfig, DEFAULT_ENV_PREFIX};
