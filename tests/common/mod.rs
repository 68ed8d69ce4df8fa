//! Shared harness for scheduling scenarios on the simulated backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use procsched::builders::SchedulerBuilder;
use procsched::config::{LaunchFailureMode, PolicyConfig, SchedulerConfig};
use procsched::core::{AuditAction, AuditEvent, InMemoryAuditSink, JobSpec, RunSummary, SchedulerError};
use procsched::infra::{InMemoryReportSink, SimulatedProcessControl};

/// Everything a scenario run leaves behind.
pub struct Outcome {
    pub result: Result<RunSummary, SchedulerError>,
    pub audit: Arc<Mutex<InMemoryAuditSink>>,
    pub reports: Arc<Mutex<InMemoryReportSink>>,
    pub control: SimulatedProcessControl,
}

impl Outcome {
    pub fn summary(&self) -> &RunSummary {
        self.result.as_ref().expect("run should succeed")
    }

    pub fn actions(&self, job: usize) -> Vec<AuditAction> {
        self.audit.lock().actions_for(job)
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.audit.lock().events()
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn run(
    control: SimulatedProcessControl,
    policy: PolicyConfig,
    cores: u32,
    mode: LaunchFailureMode,
    jobs: Vec<JobSpec>,
) -> Outcome {
    let audit = Arc::new(Mutex::new(InMemoryAuditSink::new(4096)));
    let reports = Arc::new(Mutex::new(InMemoryReportSink::new()));
    let config = SchedulerConfig::new(policy, "jobs.txt")
        .with_cores(cores)
        .with_launch_failure(mode);
    let scheduler = SchedulerBuilder::new(config)
        .with_control(Arc::new(control.clone()))
        .with_report_sink(Box::new(Arc::clone(&reports)))
        .with_audit(Box::new(Arc::clone(&audit)))
        .build()
        .expect("valid config");
    let result = scheduler.run(jobs);
    Outcome {
        result,
        audit,
        reports,
        control,
    }
}

/// Replays the audit log and asserts every job follows
/// `Launch (Suspend Resume)* Suspend? Exit`, and that a suspend is always
/// issued by the worker that launched or resumed the job.
pub fn assert_well_formed_lifecycles(events: &[AuditEvent], jobs: usize) {
    for job in 0..jobs {
        let mut owner: Option<Option<usize>> = None;
        let mut running = false;
        let mut exited = false;
        let mut launched = false;
        for event in events.iter().filter(|e| e.job == job) {
            assert!(!exited, "job {job} saw {:?} after exit", event.action);
            match event.action {
                AuditAction::Launch => {
                    assert!(!launched, "job {job} launched twice");
                    launched = true;
                    running = true;
                    owner = Some(event.worker);
                }
                AuditAction::Resume => {
                    assert!(launched && !running, "job {job} resumed while running");
                    running = true;
                    owner = Some(event.worker);
                }
                AuditAction::Suspend => {
                    assert!(running, "job {job} suspended while stopped");
                    assert_eq!(owner, Some(event.worker), "job {job} preempted by a foreign worker");
                    running = false;
                }
                AuditAction::Exit => {
                    assert!(launched, "job {job} exited before launch");
                    exited = true;
                }
                AuditAction::Reject | AuditAction::LaunchFailed | AuditAction::Cancel => {
                    assert!(!launched, "job {job} dropped after launch");
                    exited = true;
                }
            }
        }
    }
}
