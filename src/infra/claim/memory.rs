//! In-memory claim store for development, tests, and single-process deployments.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{ClaimRecord, ClaimStore};
use crate::core::TaskError;
use crate::util::clock::now_ms;

/// Version-checked claim records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    records: RwLock<HashMap<String, ClaimRecord>>,
}

impl InMemoryClaimStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a task claimable. Returns its current version; an existing record
    /// is left untouched.
    pub fn register(&self, task_id: impl Into<String>) -> u64 {
        let mut records = self.records.write();
        records
            .entry(task_id.into())
            .or_insert(ClaimRecord {
                owner: None,
                version: 0,
                claimed_at_ms: None,
            })
            .version
    }

    /// Delete a task's record. Later claims on it fail.
    pub fn remove(&self, task_id: &str) -> bool {
        self.records.write().remove(task_id).is_some()
    }

    /// Number of known tasks.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ClaimStore for InMemoryClaimStore {
    fn record(&self, task_id: &str) -> Option<ClaimRecord> {
        self.records.read().get(task_id).cloned()
    }

    fn try_claim(
        &self,
        task_id: &str,
        owner: &str,
        expected_version: u64,
    ) -> Result<bool, TaskError> {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(task_id) else {
            return Ok(false);
        };
        if record.owner.is_some() || record.version != expected_version {
            tracing::debug!(
                task = task_id,
                owner,
                expected_version,
                actual_version = record.version,
                "claim rejected"
            );
            return Ok(false);
        }
        record.owner = Some(owner.to_string());
        record.version += 1;
        record.claimed_at_ms = Some(now_ms());
        Ok(true)
    }

    fn release(&self, task_id: &str, owner: &str) -> Result<bool, TaskError> {
        let mut records = self.records.write();
        match records.get_mut(task_id) {
            Some(record) if record.owner.as_deref() == Some(owner) => {
                record.owner = None;
                record.version += 1;
                record.claimed_at_ms = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
