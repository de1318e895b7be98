//! Builders to construct task pools from configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{PoolConfig, SchedulerConfig};
use crate::core::{AuditSink, PoolError, TaskPool};

/// Step-by-step construction of a single [`TaskPool`].
pub struct PoolBuilder {
    name: String,
    config: PoolConfig,
    cancel_timeout: Option<Duration>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PoolBuilder {
    /// Start from an existing configuration.
    pub fn new(name: impl Into<String>, config: PoolConfig) -> Self {
        Self {
            name: name.into(),
            config,
            cancel_timeout: None,
            audit: None,
        }
    }

    /// Pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration collected so far.
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Set the number of worker slots.
    #[must_use]
    pub const fn capacity(mut self, capacity: u32) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the cancel timeout. The pool uses it exactly; the configuration
    /// view rounds it up to whole seconds.
    #[must_use]
    pub const fn cancel_timeout(mut self, timeout: Duration) -> Self {
        let partial = if timeout.subsec_nanos() > 0 { 1 } else { 0 };
        self.config.cancel_timeout_secs = timeout.as_secs().saturating_add(partial);
        self.cancel_timeout = Some(timeout);
        self
    }

    /// Report admission decisions to `audit`.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate and build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration is invalid.
    pub fn build<S>(self, spawner: S) -> Result<TaskPool<S>, PoolError> {
        self.config.validate()?;
        let mut limits = self.config.limits();
        if let Some(timeout) = self.cancel_timeout {
            limits = limits.with_cancel_timeout(timeout);
        }
        Ok(match self.audit {
            Some(audit) => TaskPool::with_audit(self.name, limits, spawner, audit),
            None => TaskPool::new(self.name, limits, spawner),
        })
    }
}

/// Build one pool per configured name, sharing a spawner.
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfig`] if the scheduler configuration is invalid.
pub fn build_pools<S: Clone>(
    cfg: &SchedulerConfig,
    spawner: &S,
) -> Result<HashMap<String, TaskPool<S>>, PoolError> {
    cfg.validate()?;

    let mut pools = HashMap::with_capacity(cfg.pools.len());
    for (name, pool_cfg) in &cfg.pools {
        let pool = PoolBuilder::new(name.clone(), pool_cfg.clone()).build(spawner.clone())?;
        pools.insert(name.clone(), pool);
    }
    Ok(pools)
}
