//! Dispatch policies.
//!
//! A policy drains a run's job queue, driving each job through
//! `NEW -> RUNNING (-> STOPPED -> RUNNING)* -> EXITED` while keeping the core
//! budget balanced. Two policies are provided:
//!
//! - [`Fcfs`]: one dispatch loop; admits every queued job that fits the free
//!   cores, then blocks for the next exit.
//! - [`RoundRobin`]: a pool of dispatch workers that each run a job for one
//!   quantum, suspend it, and send it to the back of the queue.

mod fcfs;
mod round_robin;

pub use fcfs::Fcfs;
pub use round_robin::RoundRobin;

use std::sync::Arc;

use crate::config::PolicyConfig;
use crate::core::context::RunContext;
use crate::core::SchedulerError;

/// A way of dispatching a run's queue to completion.
pub trait DispatchPolicy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Dispatch until the queue is empty and no job is outstanding.
    ///
    /// # Errors
    ///
    /// Returns an error if a dispatch thread cannot be started or dies, or if
    /// the run can make no progress.
    fn dispatch(&self, ctx: &Arc<RunContext>) -> Result<(), SchedulerError>;
}

/// Build the policy selected by configuration. Round-robin runs one
/// dispatch worker per configured core.
#[must_use]
pub fn from_config(policy: &PolicyConfig, cores: u32) -> Box<dyn DispatchPolicy> {
    match policy.quantum() {
        None => Box::new(Fcfs),
        Some(quantum) => Box::new(RoundRobin::new(quantum, cores as usize)),
    }
}
