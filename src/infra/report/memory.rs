//! In-memory report sink for tests and embedding.

use crate::core::report::{FailedLaunch, JobReport, RejectedJob, ReportSink};

/// Collects outcomes in arrival order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReportSink {
    completed: Vec<JobReport>,
    rejected: Vec<RejectedJob>,
    failed: Vec<FailedLaunch>,
}

impl InMemoryReportSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed jobs in exit order.
    #[must_use]
    pub fn reports(&self) -> &[JobReport] {
        &self.completed
    }

    /// Rejected jobs.
    #[must_use]
    pub fn rejections(&self) -> &[RejectedJob] {
        &self.rejected
    }

    /// Failed launches.
    #[must_use]
    pub fn failures(&self) -> &[FailedLaunch] {
        &self.failed
    }

    /// Commands of completed jobs in exit order.
    #[must_use]
    pub fn exit_order(&self) -> Vec<String> {
        self.completed.iter().map(|r| r.command.clone()).collect()
    }
}

impl ReportSink for InMemoryReportSink {
    fn completed(&mut self, report: &JobReport) {
        self.completed.push(report.clone());
    }

    fn rejected(&mut self, job: &RejectedJob) {
        self.rejected.push(job.clone());
    }

    fn failed(&mut self, job: &FailedLaunch) {
        self.failed.push(job.clone());
    }
}
