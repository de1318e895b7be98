//! Audit trail of admission decisions.
//!
//! The pool reports every admission, eviction and rejection to an optional
//! [`AuditSink`]. The bundled [`InMemoryAuditSink`] keeps a bounded buffer for
//! tests and development; production sinks forward events to storage.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Claimed and started.
    Admitted,
    /// Skipped because another owner holds the claim.
    ClaimConflict,
    /// Stopped the batch for lack of capacity.
    Rejected,
    /// Run finished successfully.
    Completed,
    /// Run returned an error.
    Failed,
    /// Evicted because its deadline passed.
    Expired,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admitted => "admitted",
            Self::ClaimConflict => "claim_conflict",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related task identity.
    pub task_id: String,
    /// Pool name.
    pub pool: String,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context such as an error message.
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Build an event with a fresh UUID and the current time.
    pub fn new(
        task_id: impl Into<String>,
        pool: impl Into<String>,
        action: AuditAction,
        detail: Option<String>,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            pool: pool.into(),
            action,
            created_at_ms: now_ms(),
            detail,
        }
    }
}

/// Audit sink abstraction. Called from spawned completions, so it must be
/// shareable across threads and must not block for long.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Events for one action, oldest first.
    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}
