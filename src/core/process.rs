//! Process-control capability consumed by the dispatch policies.
//!
//! The scheduler never forks or signals directly. It talks to a
//! [`ProcessControl`] implementation which launches executables, delivers
//! suspend/resume requests, and posts an [`ExitEvent`] on a channel for every
//! launched process that terminates.

use std::time::Instant;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// External (operating system) process identifier.
pub type Pid = u32;

/// Notification that a launched process has terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitEvent {
    /// Process that exited.
    pub pid: Pid,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// When the exit was observed.
    pub observed_at: Instant,
}

impl ExitEvent {
    /// Build an event observed now.
    #[must_use]
    pub fn now(pid: Pid, code: Option<i32>) -> Self {
        Self {
            pid,
            code,
            observed_at: Instant::now(),
        }
    }
}

/// Outcome of a finished process as shown in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Exited normally with the given code.
    Code(i32),
    /// Killed by a signal.
    Signaled,
}

impl From<Option<i32>> for ExitStatus {
    fn from(code: Option<i32>) -> Self {
        code.map_or(Self::Signaled, Self::Code)
    }
}

/// Launcher and signal mechanism for external processes.
///
/// Implementations must be callable from several dispatch workers at once.
pub trait ProcessControl: Send + Sync {
    /// Start the executable at `command` and return its process id.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Launch`] if the process could not be started.
    fn launch(&self, command: &str) -> Result<Pid, SchedulerError>;

    /// Stop a running process.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Signal`] if the request could not be delivered,
    /// typically because the process has already exited.
    fn suspend(&self, pid: Pid) -> Result<(), SchedulerError>;

    /// Continue a stopped process.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Signal`] if the request could not be delivered.
    fn resume(&self, pid: Pid) -> Result<(), SchedulerError>;

    /// Channel on which an [`ExitEvent`] is posted for every launched process.
    fn exit_events(&self) -> Receiver<ExitEvent>;
}
