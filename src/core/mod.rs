//! Core scheduling abstractions and core-budget accounting.

pub mod audit;
pub mod budget;
pub mod completion;
pub mod context;
pub mod error;
pub mod job;
pub mod policy;
pub mod process;
pub mod queue;
pub mod registry;
pub mod report;
pub mod scheduler;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use budget::ResourceBudget;
pub use error::{AppResult, SchedulerError};
pub use job::{JobId, JobRecord, JobSpec, JobState, JobTable};
pub use policy::{DispatchPolicy, Fcfs, RoundRobin};
pub use process::{ExitEvent, ExitStatus, Pid, ProcessControl};
pub use queue::JobQueue;
pub use registry::ProcessRegistry;
pub use report::{FailedLaunch, JobReport, RejectedJob, ReportSink, RunSummary};
pub use scheduler::Scheduler;
