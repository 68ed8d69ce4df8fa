//! Per-job timing reports and the run summary.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::job::JobId;
use crate::core::process::{ExitStatus, Pid};

/// Timing metrics emitted when a job's process exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    /// Job id within the run.
    pub job: JobId,
    /// Process id of the finished job.
    pub pid: Pid,
    /// Executable path.
    pub command: String,
    /// Submission to end, seconds.
    pub elapsed_secs: f64,
    /// Start to end, seconds.
    pub execution_secs: f64,
    /// Workload start to end, seconds.
    pub workload_secs: f64,
    /// How the process ended.
    pub status: ExitStatus,
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID {} - CMD: {}", self.pid, self.command)?;
        writeln!(f, "\tElapsed time = {:.2} secs", self.elapsed_secs)?;
        writeln!(f, "\tExecution time = {:.2} secs", self.execution_secs)?;
        write!(f, "\tWorkload time = {:.2} secs", self.workload_secs)
    }
}

/// A job turned away because it can never fit the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedJob {
    /// Job id within the run.
    pub job: JobId,
    /// Executable path.
    pub command: String,
    /// Cores it asked for.
    pub required: u32,
    /// Cores configured.
    pub total: u32,
}

impl fmt::Display for RejectedJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "REJECTED {} - requires {} cores, {} available",
            self.command, self.required, self.total
        )
    }
}

/// A job whose process could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLaunch {
    /// Job id within the run.
    pub job: JobId,
    /// Executable path.
    pub command: String,
    /// Launcher error message.
    pub reason: String,
}

impl fmt::Display for FailedLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FAILED {} - {}", self.command, self.reason)
    }
}

/// Receives outcomes as they happen.
pub trait ReportSink: Send {
    /// A job's process exited.
    fn completed(&mut self, report: &JobReport);

    /// A job was rejected for exceeding the budget.
    fn rejected(&mut self, _job: &RejectedJob) {}

    /// A job's process could not be launched.
    fn failed(&mut self, _job: &FailedLaunch) {}
}

impl<S: ReportSink> ReportSink for std::sync::Arc<parking_lot::Mutex<S>> {
    fn completed(&mut self, report: &JobReport) {
        self.lock().completed(report);
    }

    fn rejected(&mut self, job: &RejectedJob) {
        self.lock().rejected(job);
    }

    fn failed(&mut self, job: &FailedLaunch) {
        self.lock().failed(job);
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Completed jobs in exit order.
    pub reports: Vec<JobReport>,
    /// Jobs rejected at admission.
    pub rejected: Vec<RejectedJob>,
    /// Jobs whose launch failed.
    pub failed: Vec<FailedLaunch>,
    /// Jobs dropped unlaunched after an aborting launch failure.
    pub cancelled: Vec<String>,
    /// Total workload time, seconds.
    pub workload_secs: f64,
    /// Most cores charged at once.
    pub peak_cores: u32,
}

impl RunSummary {
    /// Whether every submitted job ran to completion.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty() && self.cancelled.is_empty()
    }

    /// Workload time as a duration.
    #[must_use]
    pub fn workload(&self) -> Duration {
        Duration::from_secs_f64(self.workload_secs.max(0.0))
    }
}
