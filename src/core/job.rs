//! Job records and the per-run job table.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::process::Pid;

/// Index of a job within its run's [`JobTable`].
pub type JobId = usize;

/// Description of a job as read from the job file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Executable path.
    pub command: String,
    /// Cores the job must hold while it runs.
    pub cores: u32,
}

impl JobSpec {
    /// Job requiring a single core.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cores: 1,
        }
    }

    /// Override the core requirement.
    #[must_use]
    pub const fn with_cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Submitted, never launched.
    New,
    /// Process is executing.
    Running,
    /// Process is suspended between quanta.
    Stopped,
    /// Process terminated.
    Exited,
    /// Needs more cores than the scheduler owns; never launched.
    Rejected,
    /// The launcher could not start the process.
    Failed,
    /// Dropped without launching after a fatal launch failure.
    Cancelled,
}

impl JobState {
    /// Whether the job will never change state again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Exited | Self::Rejected | Self::Failed | Self::Cancelled
        )
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Running | Self::Rejected | Self::Failed | Self::Cancelled)
                | (Self::Running, Self::Stopped | Self::Exited)
                | (Self::Stopped, Self::Running | Self::Exited)
        )
    }
}

/// One schedulable unit.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Position in the job table.
    pub id: JobId,
    /// Executable path.
    pub command: String,
    /// Required cores.
    pub cores: u32,
    /// Process id, assigned at first launch.
    pub pid: Option<Pid>,
    /// Current lifecycle state.
    pub state: JobState,
    /// Set at ingestion.
    pub submitted_at: Instant,
    /// Set at first dispatch.
    pub started_at: Option<Instant>,
    /// Set at termination.
    pub ended_at: Option<Instant>,
    /// Cores currently debited from the budget on behalf of this job.
    pub charged: u32,
}

impl JobRecord {
    /// Record a freshly submitted job.
    #[must_use]
    pub fn new(id: JobId, spec: JobSpec, submitted_at: Instant) -> Self {
        Self {
            id,
            command: spec.command,
            cores: spec.cores,
            pid: None,
            state: JobState::New,
            submitted_at,
            started_at: None,
            ended_at: None,
            charged: 0,
        }
    }

    /// Move to `next`, returning `false` (and leaving the record untouched)
    /// when the lifecycle forbids it.
    pub fn transition(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                job = self.id,
                from = ?self.state,
                to = ?next,
                "illegal job state transition ignored"
            );
            return false;
        }
        self.state = next;
        true
    }

    /// First launch: assigns the pid and start time.
    pub fn launched(&mut self, pid: Pid, now: Instant) -> bool {
        if !self.transition(JobState::Running) {
            return false;
        }
        self.pid = Some(pid);
        self.started_at = Some(now.max(self.submitted_at));
        true
    }

    /// Termination: assigns the end time.
    pub fn exited(&mut self, now: Instant) -> bool {
        if !self.transition(JobState::Exited) {
            return false;
        }
        let floor = self.started_at.unwrap_or(self.submitted_at);
        self.ended_at = Some(now.max(floor));
        true
    }

    /// Submission to end.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.submitted_at)
    }

    /// Start to end.
    #[must_use]
    pub fn execution(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// All jobs submitted in one scheduling run, indexed by [`JobId`].
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<JobRecord>,
}

impl JobTable {
    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Ingest a job and return its id.
    pub fn submit(&mut self, spec: JobSpec, now: Instant) -> JobId {
        let id = self.jobs.len();
        self.jobs.push(JobRecord::new(id, spec, now));
        id
    }

    /// Look up a job.
    #[must_use]
    pub fn get(&self, id: JobId) -> Option<&JobRecord> {
        self.jobs.get(id)
    }

    /// Look up a job for mutation.
    pub fn get_mut(&mut self, id: JobId) -> Option<&mut JobRecord> {
        self.jobs.get_mut(id)
    }

    /// Number of submitted jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no jobs were submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs not yet in a terminal state.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.jobs.iter().filter(|j| !j.state.is_terminal()).count()
    }
}
