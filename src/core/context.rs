//! State shared by the dispatch policies and the completion handler for one
//! scheduling run.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::config::LaunchFailureMode;
use crate::core::audit::{build_audit_event, AuditAction};
use crate::core::budget::ResourceBudget;
use crate::core::completion::{CompletionHandler, SharedAudit, SharedReports};
use crate::core::job::{JobId, JobState, JobTable};
use crate::core::process::{ExitEvent, Pid, ProcessControl};
use crate::core::queue::JobQueue;
use crate::core::registry::ProcessRegistry;
use crate::core::report::{FailedLaunch, JobReport, RejectedJob, RunSummary};
use crate::core::SchedulerError;
use crate::util::clock::Clock;

/// Mutable run state. Queue, registry, and job records are always
/// mutated together under one lock.
#[derive(Debug, Default)]
pub struct RunState {
    /// Every submitted job.
    pub jobs: JobTable,
    /// Jobs awaiting dispatch.
    pub queue: JobQueue,
    /// Launched, not yet reaped processes.
    pub registry: ProcessRegistry,
    /// Outcomes collected so far.
    pub outcomes: RunSummary,
    /// First launch failure under [`LaunchFailureMode::Abort`].
    pub aborted: Option<SchedulerError>,
}

/// Collaborators handed to a run.
pub struct RunResources {
    /// Process launcher and signal mechanism.
    pub control: Arc<dyn ProcessControl>,
    /// Timestamp source.
    pub clock: Arc<dyn Clock>,
    /// Report destination.
    pub reports: SharedReports,
    /// Optional lifecycle audit.
    pub audit: Option<SharedAudit>,
}

/// Everything a dispatch policy needs for one run.
pub struct RunContext {
    state: Mutex<RunState>,
    /// Signaled whenever cores are released or a job exits.
    wake: Condvar,
    budget: ResourceBudget,
    control: Arc<dyn ProcessControl>,
    events: Receiver<ExitEvent>,
    clock: Arc<dyn Clock>,
    completion: CompletionHandler,
    reports: SharedReports,
    audit: Option<SharedAudit>,
    launch_failure: LaunchFailureMode,
}

impl RunContext {
    /// Build a context over ingested jobs.
    pub fn new(
        state: RunState,
        total_cores: u32,
        launch_failure: LaunchFailureMode,
        workload_start: Instant,
        resources: RunResources,
    ) -> Self {
        let RunResources {
            control,
            clock,
            reports,
            audit,
        } = resources;
        let events = control.exit_events();
        let completion =
            CompletionHandler::new(workload_start, Arc::clone(&reports), audit.clone());
        Self {
            state: Mutex::new(state),
            wake: Condvar::new(),
            budget: ResourceBudget::new(total_cores),
            control,
            events,
            clock,
            completion,
            reports,
            audit,
            launch_failure,
        }
    }

    /// Lock the run state.
    pub fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock()
    }

    /// Condition variable paired with the state lock.
    pub const fn wake(&self) -> &Condvar {
        &self.wake
    }

    /// Core budget.
    pub const fn budget(&self) -> &ResourceBudget {
        &self.budget
    }

    /// Process launcher and signal mechanism.
    pub fn control(&self) -> &dyn ProcessControl {
        self.control.as_ref()
    }

    /// Exit notifications.
    pub const fn events(&self) -> &Receiver<ExitEvent> {
        &self.events
    }

    /// Timestamp source.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Record a lifecycle transition.
    pub fn record(&self, job: JobId, pid: Option<Pid>, action: AuditAction, worker: Option<usize>) {
        if let Some(audit) = &self.audit {
            audit.lock().record(build_audit_event(job, pid, action, worker));
        }
    }

    /// Run the completion handler and wake anyone waiting on cores.
    pub fn handle_exit(&self, state: &mut RunState, event: ExitEvent) -> Option<JobReport> {
        let report = self.completion.handle(state, &self.budget, event);
        self.wake.notify_all();
        report
    }

    /// Credit cores back and wake waiters.
    pub fn release(&self, cores: u32) {
        if cores > 0 {
            self.budget.release(cores);
            self.wake.notify_all();
        }
    }

    /// Drop a new job that must not be launched: oversized jobs are rejected,
    /// and after an aborting launch failure everything is cancelled. Returns
    /// `true` if the job was dropped.
    pub fn screen(&self, state: &mut RunState, id: JobId, worker: Option<usize>) -> bool {
        let Some(job) = state.jobs.get_mut(id) else {
            return true;
        };
        if state.aborted.is_some() {
            if job.transition(JobState::Cancelled) {
                info!(job = id, command = %job.command, "job cancelled after launch failure");
                state.outcomes.cancelled.push(job.command.clone());
                self.record(id, None, AuditAction::Cancel, worker);
            }
            return true;
        }
        if self.budget.fits(job.cores) {
            return false;
        }
        if job.transition(JobState::Rejected) {
            let err = SchedulerError::ResourceOverflow {
                command: job.command.clone(),
                required: job.cores,
                total: self.budget.total(),
            };
            warn!(job = id, error = %err, "job rejected");
            let rejected = RejectedJob {
                job: id,
                command: job.command.clone(),
                required: job.cores,
                total: self.budget.total(),
            };
            self.reports.lock().rejected(&rejected);
            state.outcomes.rejected.push(rejected);
            self.record(id, None, AuditAction::Reject, worker);
        }
        true
    }

    /// Launch a new job whose cores have already been debited. Registers the
    /// pid before returning. On failure the cores are credited back and the
    /// job is marked failed; returns `false`.
    pub fn launch(&self, state: &mut RunState, id: JobId, worker: Option<usize>) -> bool {
        let Some((command, cores)) = state.jobs.get(id).map(|j| (j.command.clone(), j.cores)) else {
            return false;
        };

        match self.control.launch(&command) {
            Ok(pid) => {
                let now = self.clock.now();
                if let Some(job) = state.jobs.get_mut(id) {
                    job.launched(pid, now);
                    job.charged = cores;
                }
                state.registry.register(pid, id);
                self.record(id, Some(pid), AuditAction::Launch, worker);
                info!(job = id, pid, command = %command, cores, worker = ?worker, "job launched");
                true
            }
            Err(err) => {
                self.release(cores);
                if let Some(job) = state.jobs.get_mut(id) {
                    job.transition(JobState::Failed);
                }
                let reason = match &err {
                    SchedulerError::Launch { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                error!(job = id, command = %command, error = %err, "launch failed");
                let failed = FailedLaunch {
                    job: id,
                    command,
                    reason,
                };
                self.reports.lock().failed(&failed);
                state.outcomes.failed.push(failed);
                self.record(id, None, AuditAction::LaunchFailed, worker);
                if self.launch_failure == LaunchFailureMode::Abort && state.aborted.is_none() {
                    state.aborted = Some(err);
                }
                false
            }
        }
    }

    /// Collect outcomes once dispatch has finished.
    ///
    /// # Errors
    ///
    /// Returns the launch error that aborted the run, if any.
    pub fn finish(&self, workload_secs: f64) -> Result<RunSummary, SchedulerError> {
        let mut state = self.lock();
        if let Some(err) = state.aborted.take() {
            return Err(err);
        }
        let mut summary = std::mem::take(&mut state.outcomes);
        summary.workload_secs = workload_secs;
        summary.peak_cores = self.budget.peak();
        Ok(summary)
    }
}
