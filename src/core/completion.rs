//! Completion handler: turns process exit notifications into finished jobs.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::budget::ResourceBudget;
use crate::core::context::RunState;
use crate::core::process::{ExitEvent, ExitStatus};
use crate::core::report::{JobReport, ReportSink};
use crate::util::clock::secs_between;

/// Shared audit sink handle.
pub type SharedAudit = Arc<Mutex<Box<dyn AuditSink>>>;
/// Shared report sink handle.
pub type SharedReports = Arc<Mutex<Box<dyn ReportSink>>>;

/// Resolves exit events against the process registry.
///
/// Callers pass the run state they have locked; the handler never takes the
/// state lock itself, so the FCFS loop and the round-robin notification
/// thread serialize it the same way they serialize dispatch.
pub struct CompletionHandler {
    workload_start: Instant,
    reports: SharedReports,
    audit: Option<SharedAudit>,
}

impl CompletionHandler {
    /// Handler measuring workload time from `workload_start`.
    pub fn new(workload_start: Instant, reports: SharedReports, audit: Option<SharedAudit>) -> Self {
        Self {
            workload_start,
            reports,
            audit,
        }
    }

    /// Mark the job behind `event.pid` exited, credit its cores, and emit its
    /// report. The end time is when the backend observed the exit, not when
    /// the event was dequeued.
    ///
    /// Unknown pids (never launched here, or already handled) are logged and
    /// ignored, so a repeated notification has no effect.
    pub fn handle(
        &self,
        state: &mut RunState,
        budget: &ResourceBudget,
        event: ExitEvent,
    ) -> Option<JobReport> {
        let Some(id) = state.registry.remove(event.pid) else {
            warn!(pid = event.pid, "exit event for untracked process ignored");
            return None;
        };
        let Some(job) = state.jobs.get_mut(id) else {
            warn!(pid = event.pid, job = id, "registry points at missing job");
            return None;
        };

        if !job.exited(event.observed_at) {
            return None;
        }
        let charged = std::mem::take(&mut job.charged);
        if charged > 0 {
            budget.release(charged);
        }

        let end = job.ended_at.unwrap_or(event.observed_at);
        let report = JobReport {
            job: id,
            pid: event.pid,
            command: job.command.clone(),
            elapsed_secs: job.elapsed().unwrap_or_default().as_secs_f64(),
            execution_secs: job.execution().unwrap_or_default().as_secs_f64(),
            workload_secs: secs_between(self.workload_start, end),
            status: ExitStatus::from(event.code),
        };

        info!(
            job = id,
            pid = event.pid,
            command = %report.command,
            code = ?event.code,
            released = charged,
            "job exited"
        );
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(id, Some(event.pid), AuditAction::Exit, None));
        }
        self.reports.lock().completed(&report);
        state.outcomes.reports.push(report.clone());
        Some(report)
    }
}
