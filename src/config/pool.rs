//! Pool and scheduler configuration structures.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{PoolError, PoolLimits};

/// Environment prefix read by [`PoolConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "TASK_POOL";

const fn default_cancel_timeout_secs() -> u64 {
    PoolLimits::DEFAULT_CANCEL_TIMEOUT.as_secs()
}

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Total worker slots.
    pub capacity: u32,
    /// Seconds allowed for one forced cancellation.
    #[serde(default = "default_cancel_timeout_secs")]
    pub cancel_timeout_secs: u64,
}

impl Default for PoolConfig {
    /// One slot per logical CPU.
    fn default() -> Self {
        Self {
            capacity: u32::try_from(num_cpus::get()).unwrap_or(u32::MAX),
            cancel_timeout_secs: default_cancel_timeout_secs(),
        }
    }
}

impl PoolConfig {
    /// Validate pool configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for a zero capacity or timeout.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "capacity must be greater than 0".into(),
            ));
        }
        if self.cancel_timeout_secs == 0 {
            return Err(PoolError::InvalidConfig(
                "cancel_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Limits derived from this configuration.
    #[must_use]
    pub const fn limits(&self) -> PoolLimits {
        PoolLimits::new(self.capacity)
            .with_cancel_timeout(Duration::from_secs(self.cancel_timeout_secs))
    }

    /// Load from `TASK_POOL_CAPACITY` and `TASK_POOL_CANCEL_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// See [`from_env_prefixed`](Self::from_env_prefixed).
    pub fn from_env() -> Result<Self, PoolError> {
        Self::from_env_prefixed(DEFAULT_ENV_PREFIX)
    }

    /// Load `<PREFIX>_CAPACITY` and `<PREFIX>_CANCEL_TIMEOUT_SECS`, reading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if a variable does not parse or the
    /// result fails validation.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, PoolError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        if let Some(capacity) = read_var::<u32>(&format!("{prefix}_CAPACITY"))? {
            cfg.capacity = capacity;
        }
        if let Some(secs) = read_var::<u64>(&format!("{prefix}_CANCEL_TIMEOUT_SECS"))? {
            cfg.cancel_timeout_secs = secs;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, PoolError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| PoolError::InvalidConfig(format!("{name}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(PoolError::InvalidConfig(format!("{name}: {e}"))),
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
}

impl SchedulerConfig {
    /// Validate all pools and ensure at least one pool exists.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] naming the first invalid pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.pools.is_empty() {
            return Err(PoolError::InvalidConfig(
                "at least one pool must be defined".into(),
            ));
        }
        for (name, pool) in &self.pools {
            pool.validate().map_err(|e| match e {
                PoolError::InvalidConfig(msg) => {
                    PoolError::InvalidConfig(format!("pool `{name}` invalid: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, PoolError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| PoolError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
