//! In-memory process backend.
//!
//! Each "process" is a thread that consumes a fixed amount of run time. It
//! only makes progress while running, so suspend/resume behave like
//! `SIGSTOP`/`SIGCONT` on a CPU-bound child. Used for development and for
//! scheduling tests that need controlled timing.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::core::process::{ExitEvent, Pid, ProcessControl};
use crate::core::SchedulerError;

const FIRST_PID: Pid = 1000;

#[derive(Debug, Clone, Copy)]
struct Program {
    runtime: Duration,
    exit_code: i32,
}

#[derive(Debug)]
struct ProcState {
    running: bool,
    remaining: Duration,
    done: bool,
}

#[derive(Debug)]
struct SimProcess {
    state: Mutex<ProcState>,
    cv: Condvar,
}

#[derive(Debug, Default)]
struct Counters {
    running: usize,
    peak_running: usize,
    launches: Vec<String>,
}

impl Counters {
    fn started(&mut self) {
        self.running += 1;
        self.peak_running = self.peak_running.max(self.running);
    }

    fn stopped(&mut self) {
        self.running = self.running.saturating_sub(1);
    }
}

#[derive(Debug)]
struct Shared {
    programs: Mutex<HashMap<String, Program>>,
    processes: Mutex<HashMap<Pid, Arc<SimProcess>>>,
    counters: Mutex<Counters>,
    next_pid: AtomicU32,
    exits_tx: Sender<ExitEvent>,
    exits_rx: Receiver<ExitEvent>,
}

/// Process backend that runs registered programs as timed threads.
#[derive(Debug, Clone)]
pub struct SimulatedProcessControl {
    shared: Arc<Shared>,
}

impl Default for SimulatedProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProcessControl {
    /// Backend with no registered programs.
    #[must_use]
    pub fn new() -> Self {
        let (exits_tx, exits_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                programs: Mutex::new(HashMap::new()),
                processes: Mutex::new(HashMap::new()),
                counters: Mutex::new(Counters::default()),
                next_pid: AtomicU32::new(FIRST_PID),
                exits_tx,
                exits_rx,
            }),
        }
    }

    /// Register `command` as a program needing `runtime` of run time and
    /// exiting with code 0.
    #[must_use]
    pub fn with_program(self, command: impl Into<String>, runtime: Duration) -> Self {
        self.with_program_exit(command, runtime, 0)
    }

    /// Register `command` with an explicit exit code.
    #[must_use]
    pub fn with_program_exit(
        self,
        command: impl Into<String>,
        runtime: Duration,
        exit_code: i32,
    ) -> Self {
        self.shared
            .programs
            .lock()
            .insert(command.into(), Program { runtime, exit_code });
        self
    }

    /// Commands in the order they were launched.
    #[must_use]
    pub fn launch_order(&self) -> Vec<String> {
        self.shared.counters.lock().launches.clone()
    }

    /// Most processes ever running (not stopped) at the same time.
    #[must_use]
    pub fn peak_running(&self) -> usize {
        self.shared.counters.lock().peak_running
    }

    fn process(&self, pid: Pid) -> Result<Arc<SimProcess>, SchedulerError> {
        self.shared
            .processes
            .lock()
            .get(&pid)
            .cloned()
            .ok_or(SchedulerError::UnknownProcess(pid))
    }

    fn set_running(&self, pid: Pid, running: bool) -> Result<(), SchedulerError> {
        let proc = self.process(pid)?;
        let mut state = proc.state.lock();
        if state.done {
            return Err(SchedulerError::Signal {
                pid,
                reason: "no such process".into(),
            });
        }
        if state.running != running {
            state.running = running;
            let mut counters = self.shared.counters.lock();
            if running {
                counters.started();
            } else {
                counters.stopped();
            }
        }
        proc.cv.notify_all();
        Ok(())
    }
}

fn run_process(shared: &Shared, pid: Pid, proc: &SimProcess, exit_code: i32) {
    let mut state = proc.state.lock();
    while !state.remaining.is_zero() {
        if state.running {
            let started = Instant::now();
            let budget = state.remaining;
            proc.cv.wait_for(&mut state, budget);
            state.remaining = state.remaining.saturating_sub(started.elapsed());
        } else {
            proc.cv.wait(&mut state);
        }
    }
    state.done = true;
    if state.running {
        state.running = false;
        shared.counters.lock().stopped();
    }
    drop(state);

    debug!(pid, exit_code, "simulated process finished");
    if shared
        .exits_tx
        .send(ExitEvent::now(pid, Some(exit_code)))
        .is_err()
    {
        debug!(pid, "exit observed after the scheduler hung up");
    }
}

impl ProcessControl for SimulatedProcessControl {
    fn launch(&self, command: &str) -> Result<Pid, SchedulerError> {
        let program = self
            .shared
            .programs
            .lock()
            .get(command)
            .copied()
            .ok_or_else(|| SchedulerError::Launch {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            })?;

        let pid = self.shared.next_pid.fetch_add(1, Ordering::Relaxed);
        let proc = Arc::new(SimProcess {
            state: Mutex::new(ProcState {
                running: true,
                remaining: program.runtime,
                done: false,
            }),
            cv: Condvar::new(),
        });
        self.shared.processes.lock().insert(pid, Arc::clone(&proc));
        {
            let mut counters = self.shared.counters.lock();
            counters.launches.push(command.to_string());
            counters.started();
        }

        let shared = Arc::clone(&self.shared);
        let name = format!("sim-{pid}");
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_process(&shared, pid, &proc, program.exit_code))
            .map_err(|source| SchedulerError::Spawn { name, source })?;
        Ok(pid)
    }

    fn suspend(&self, pid: Pid) -> Result<(), SchedulerError> {
        self.set_running(pid, false)
    }

    fn resume(&self, pid: Pid) -> Result<(), SchedulerError> {
        self.set_running(pid, true)
    }

    fn exit_events(&self) -> Receiver<ExitEvent> {
        self.shared.exits_rx.clone()
    }
}
