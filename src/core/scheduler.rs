//! Scheduler driver: ingests a workload and runs the configured policy to
//! completion.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::SchedulerConfig;
use crate::core::audit::AuditSink;
use crate::core::completion::{SharedAudit, SharedReports};
use crate::core::context::{RunContext, RunResources, RunState};
use crate::core::job::JobSpec;
use crate::core::policy::from_config;
use crate::core::process::ProcessControl;
use crate::core::report::{JobReport, ReportSink, RunSummary};
use crate::core::SchedulerError;
use crate::util::clock::{secs_between, Clock, MonotonicClock};

/// Report sink that discards everything; outcomes still land in the
/// returned [`RunSummary`].
struct DiscardReports;

impl ReportSink for DiscardReports {
    fn completed(&mut self, _report: &JobReport) {}
}

/// Drives one workload through a dispatch policy.
pub struct Scheduler {
    config: SchedulerConfig,
    control: Arc<dyn ProcessControl>,
    clock: Arc<dyn Clock>,
    reports: SharedReports,
    audit: Option<SharedAudit>,
}

impl Scheduler {
    /// Driver over a validated configuration and process backend.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn new(
        config: SchedulerConfig,
        control: Arc<dyn ProcessControl>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        let reports: Box<dyn ReportSink> = Box::new(DiscardReports);
        Ok(Self {
            config,
            control,
            clock: Arc::new(MonotonicClock),
            reports: Arc::new(Mutex::new(reports)),
            audit: None,
        })
    }

    /// Attach a lifecycle audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Send outcomes to `sink` as they happen.
    #[must_use]
    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.reports = Arc::new(Mutex::new(sink));
        self
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration this driver runs with.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ingest `jobs` in order and dispatch them until every job is terminal.
    ///
    /// # Errors
    ///
    /// Returns the launch error under [`LaunchFailureMode::Abort`] once
    /// running jobs have drained, or a dispatch failure.
    ///
    /// [`LaunchFailureMode::Abort`]: crate::config::LaunchFailureMode::Abort
    pub fn run(&self, jobs: Vec<JobSpec>) -> Result<RunSummary, SchedulerError> {
        let mut state = RunState::default();
        for spec in jobs {
            let now = self.clock.now();
            let id = state.jobs.submit(spec, now);
            state.queue.enqueue(id);
        }
        let workload_start = self.clock.now();
        let policy = from_config(&self.config.policy, self.config.cores);
        info!(
            policy = policy.name(),
            jobs = state.jobs.len(),
            cores = self.config.cores,
            "workload ingested"
        );

        let ctx = Arc::new(RunContext::new(
            state,
            self.config.cores,
            self.config.launch_failure,
            workload_start,
            RunResources {
                control: Arc::clone(&self.control),
                clock: Arc::clone(&self.clock),
                reports: Arc::clone(&self.reports),
                audit: self.audit.clone(),
            },
        ));

        policy.dispatch(&ctx)?;

        let workload_secs = secs_between(workload_start, self.clock.now());
        let summary = ctx.finish(workload_secs)?;
        info!(
            completed = summary.reports.len(),
            rejected = summary.rejected.len(),
            failed = summary.failed.len(),
            peak_cores = summary.peak_cores,
            workload_secs,
            "workload finished"
        );
        Ok(summary)
    }
}
