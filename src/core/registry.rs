//! Process id to job lookup used to resolve exit notifications.

use std::collections::HashMap;

use crate::core::job::JobId;
use crate::core::process::Pid;

/// Maps the pid of every launched, not yet reaped, job to its id.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    by_pid: HashMap<Pid, JobId>,
}

impl ProcessRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly launched process. Returns the job previously registered
    /// under the same pid, which indicates a reused id that was never reaped.
    pub fn register(&mut self, pid: Pid, job: JobId) -> Option<JobId> {
        let previous = self.by_pid.insert(pid, job);
        if let Some(stale) = previous {
            tracing::warn!(pid, stale, job, "pid reused while still registered");
        }
        previous
    }

    /// Resolve and forget a pid.
    pub fn remove(&mut self, pid: Pid) -> Option<JobId> {
        self.by_pid.remove(&pid)
    }

    /// Number of tracked processes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_pid.len()
    }

    /// Whether no process is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_pid.is_empty()
    }
}
