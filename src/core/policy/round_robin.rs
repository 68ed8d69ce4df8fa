//! Round-robin dispatch with quantum preemption across a worker pool.
//!
//! # Design
//!
//! - **One lock**: queue, registry, and job records live in the run state
//!   behind a single mutex, held only for dequeue/enqueue/registry updates.
//!   It is released for the quantum wait and around suspend/resume signals.
//! - **No polling**: the quantum is a condvar wait with a deadline; the
//!   completion thread notifies on every exit so a worker wakes as soon as
//!   its job finishes.
//! - **Budget**: a job is charged its cores when launched or resumed and
//!   credited when suspended or exited. A worker that cannot admit its job
//!   puts it back and waits for a release.
//! - **Exit races**: before suspending, the worker re-checks the job under the
//!   lock; a job that already exited is dropped, never re-queued.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver};
use tracing::{debug, info, warn};

use crate::core::audit::AuditAction;
use crate::core::context::RunContext;
use crate::core::job::{JobId, JobState, JobTable};
use crate::core::policy::DispatchPolicy;
use crate::core::process::Pid;
use crate::core::SchedulerError;

/// Round-robin dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Duration,
    workers: usize,
}

impl RoundRobin {
    /// Pool of `workers` dispatch workers (at least one) running jobs for
    /// `quantum` at a time.
    #[must_use]
    pub fn new(quantum: Duration, workers: usize) -> Self {
        Self {
            quantum,
            workers: workers.max(1),
        }
    }

    /// Quantum length.
    #[must_use]
    pub const fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Number of dispatch workers.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }
}

impl DispatchPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn dispatch(&self, ctx: &Arc<RunContext>) -> Result<(), SchedulerError> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let completion = spawn_named("rr-completion", {
            let ctx = Arc::clone(ctx);
            move || completion_loop(&ctx, &shutdown_rx)
        })?;

        let mut workers = Vec::with_capacity(self.workers);
        let mut spawn_error = None;
        for worker_id in 0..self.workers {
            let ctx = Arc::clone(ctx);
            let quantum = self.quantum;
            match spawn_named(&format!("rr-worker-{worker_id}"), move || {
                worker_loop(&ctx, worker_id, quantum);
            }) {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }
        info!(
            workers = workers.len(),
            quantum_ms = self.quantum.as_millis(),
            "round-robin workers started"
        );

        let mut result = spawn_error.map_or(Ok(()), Err);
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if handle.join().is_err() && result.is_ok() {
                result = Err(SchedulerError::WorkerPanicked(worker_id));
            }
        }

        drop(shutdown_tx);
        if completion.join().is_err() {
            warn!("completion thread panicked");
        }
        result
    }
}

fn spawn_named<F>(name: &str, f: F) -> Result<JoinHandle<()>, SchedulerError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|source| SchedulerError::Spawn {
            name: name.to_string(),
            source,
        })
}

/// Consume exit notifications until the dispatcher hangs up.
fn completion_loop(ctx: &RunContext, shutdown: &Receiver<()>) {
    loop {
        select! {
            recv(ctx.events()) -> event => match event {
                Ok(event) => {
                    let mut state = ctx.lock();
                    ctx.handle_exit(&mut state, event);
                }
                Err(_) => {
                    warn!("exit notification channel closed");
                    break;
                }
            },
            recv(shutdown) -> _ => break,
        }
    }
    debug!("completion thread exiting");
}

/// What a worker does with the job it dequeued.
enum Slot {
    /// The job was just launched on this worker's behalf.
    Run(Pid),
    /// The job was marked running again and must be continued.
    Resume(Pid),
    /// The job went back to the queue; wait for cores before retrying.
    Deferred,
    /// Nothing further to do with this job.
    Dropped,
}

fn worker_loop(ctx: &RunContext, worker: usize, quantum: Duration) {
    debug!(worker, "worker started");
    loop {
        let mut state = ctx.lock();
        let Some(id) = state.queue.dequeue() else {
            break;
        };
        let Some((job_state, cores, pid)) = state.jobs.get(id).map(|j| (j.state, j.cores, j.pid))
        else {
            continue;
        };

        let slot = match job_state {
            JobState::New => {
                if ctx.screen(&mut state, id, Some(worker)) {
                    Slot::Dropped
                } else if !ctx.budget().try_admit(cores) {
                    state.queue.enqueue(id);
                    Slot::Deferred
                } else if ctx.launch(&mut state, id, Some(worker)) {
                    state.jobs.get(id).and_then(|j| j.pid).map_or(Slot::Dropped, Slot::Run)
                } else {
                    Slot::Dropped
                }
            }
            JobState::Stopped => match pid {
                Some(pid) if ctx.budget().try_admit(cores) => {
                    if let Some(job) = state.jobs.get_mut(id) {
                        job.transition(JobState::Running);
                        job.charged = cores;
                    }
                    ctx.record(id, Some(pid), AuditAction::Resume, Some(worker));
                    Slot::Resume(pid)
                }
                Some(_) => {
                    state.queue.enqueue(id);
                    Slot::Deferred
                }
                None => Slot::Dropped,
            },
            JobState::Running => {
                warn!(worker, job = id, "dequeued a job that is already running");
                Slot::Dropped
            }
            JobState::Exited | JobState::Rejected | JobState::Failed | JobState::Cancelled => {
                Slot::Dropped
            }
        };

        match slot {
            Slot::Dropped => {}
            Slot::Deferred => {
                ctx.wake().wait_for(&mut state, quantum);
            }
            Slot::Run(pid) => {
                drop(state);
                run_quantum(ctx, worker, id, pid, quantum);
            }
            Slot::Resume(pid) => {
                drop(state);
                if let Err(err) = ctx.control().resume(pid) {
                    debug!(worker, job = id, error = %err, "resume not delivered");
                }
                run_quantum(ctx, worker, id, pid, quantum);
            }
        }
    }
    debug!(worker, "queue empty, worker exiting");
}

/// Let `id` run for one quantum, then preempt it unless it exited meanwhile.
fn run_quantum(ctx: &RunContext, worker: usize, id: JobId, pid: Pid, quantum: Duration) {
    let deadline = Instant::now() + quantum;
    let mut state = ctx.lock();
    while is_running(&state.jobs, id) {
        if ctx.wake().wait_until(&mut state, deadline).timed_out() {
            break;
        }
    }

    if !is_running(&state.jobs, id) {
        debug!(worker, job = id, pid, "job exited during its quantum");
        return;
    }
    if let Some(job) = state.jobs.get_mut(id) {
        job.transition(JobState::Stopped);
    }
    ctx.record(id, Some(pid), AuditAction::Suspend, Some(worker));
    drop(state);

    if let Err(err) = ctx.control().suspend(pid) {
        debug!(worker, job = id, error = %err, "suspend not delivered");
    }

    let mut state = ctx.lock();
    let Some(job) = state.jobs.get_mut(id) else {
        return;
    };
    let charged = std::mem::take(&mut job.charged);
    let requeue = job.state == JobState::Stopped;
    if requeue {
        state.queue.enqueue(id);
    }
    ctx.release(charged);
    debug!(worker, job = id, pid, requeue, "quantum expired");
}

fn is_running(jobs: &JobTable, id: JobId) -> bool {
    jobs.get(id).is_some_and(|j| j.state == JobState::Running)
}
