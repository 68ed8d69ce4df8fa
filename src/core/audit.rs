//! Lifecycle audit log.
//!
//! Every state change a policy or the completion handler applies to a job is
//! recorded as an [`AuditEvent`]. Sinks are optional; the in-memory sink keeps
//! a bounded window of recent events for tests and diagnostics.

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::job::JobId;
use crate::core::process::Pid;

/// What happened to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// First launch of the process.
    Launch,
    /// Stopped at the end of a quantum.
    Suspend,
    /// Continued for another quantum.
    Resume,
    /// Exit observed by the completion handler.
    Exit,
    /// Needs more cores than configured.
    Reject,
    /// Launcher failed.
    LaunchFailed,
    /// Dropped without launching.
    Cancel,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Launch => "launch",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
            Self::Exit => "exit",
            Self::Reject => "reject",
            Self::LaunchFailed => "launch_failed",
            Self::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Job the event refers to.
    pub job: JobId,
    /// Process id, once launched.
    pub pid: Option<Pid>,
    /// Transition that occurred.
    pub action: AuditAction,
    /// Dispatch worker that applied it (`None` for the FCFS loop and the
    /// completion handler).
    pub worker: Option<usize>,
    /// When it was recorded.
    pub at: Instant,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Actions recorded for one job, oldest first.
    #[must_use]
    pub fn actions_for(&self, job: JobId) -> Vec<AuditAction> {
        self.events
            .iter()
            .filter(|e| e.job == job)
            .map(|e| e.action)
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// A shared handle records into the sink it wraps, so a caller can keep a
/// clone and inspect the events after a run.
impl<S: AuditSink> AuditSink for std::sync::Arc<parking_lot::Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// Helper to build an audit event stamped now.
#[must_use]
pub fn build_audit_event(
    job: JobId,
    pid: Option<Pid>,
    action: AuditAction,
    worker: Option<usize>,
) -> AuditEvent {
    AuditEvent {
        job,
        pid,
        action,
        worker,
        at: Instant::now(),
    }
}
