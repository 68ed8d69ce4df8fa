//! First-come-first-served dispatch with core-budget admission.

use std::sync::Arc;

use tracing::debug;

use crate::core::context::{RunContext, RunState};
use crate::core::job::JobState;
use crate::core::policy::DispatchPolicy;
use crate::core::SchedulerError;

/// Single-threaded FCFS dispatcher.
///
/// Each round scans the whole queue front to back and launches every new job
/// whose cores fit what is free at that moment, so small jobs behind a large
/// one fill spare capacity while equally fitting jobs keep submission order.
/// It then blocks until some launched process exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fcfs;

impl Fcfs {
    /// Launch every admissible queued job; returns how many were launched.
    /// Jobs that do not fit yet keep their place in the queue.
    fn admission_scan(ctx: &RunContext, state: &mut RunState) -> usize {
        let mut settled = Vec::new();
        let mut launched = 0;

        for id in state.queue.snapshot() {
            let Some(job) = state.jobs.get(id) else {
                settled.push(id);
                continue;
            };
            if job.state != JobState::New {
                settled.push(id);
                continue;
            }
            let cores = job.cores;
            if ctx.screen(state, id, None) {
                settled.push(id);
                continue;
            }
            if !ctx.budget().try_admit(cores) {
                continue;
            }
            if ctx.launch(state, id, None) {
                launched += 1;
            }
            settled.push(id);
        }
        state.queue.scan(|id| !settled.contains(&id));
        launched
    }
}

impl DispatchPolicy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn dispatch(&self, ctx: &Arc<RunContext>) -> Result<(), SchedulerError> {
        loop {
            {
                let mut state = ctx.lock();
                let launched = Self::admission_scan(ctx, &mut state);
                let running = state.registry.len();
                debug!(
                    launched,
                    running,
                    queued = state.queue.len(),
                    free = ctx.budget().available(),
                    "admission scan done"
                );
                if state.jobs.outstanding() == 0 {
                    return Ok(());
                }
                if running == 0 {
                    return Err(SchedulerError::Stalled {
                        queued: state.queue.len(),
                    });
                }
            }

            let event = ctx.events().recv().map_err(|_| {
                SchedulerError::ExitChannelClosed {
                    outstanding: ctx.lock().registry.len(),
                }
            })?;
            let mut state = ctx.lock();
            ctx.handle_exit(&mut state, event);
        }
    }
}
