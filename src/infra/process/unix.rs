//! Operating-system process backend.
//!
//! Jobs are spawned with [`std::process::Command`]; a reaper thread per child
//! waits for it and posts the exit on the notification channel. Suspend and
//! resume deliver `SIGSTOP`/`SIGCONT` through `nix`.
//!
//! A pid stays reserved until its reaper has collected it: the reaper first
//! observes the exit without reaping, then reaps under the same lock that
//! signal delivery holds. A signal therefore either reaches the job's own
//! process (alive or a zombie) or is refused, never a recycled pid.

use std::collections::HashSet;
use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::core::process::{ExitEvent, Pid, ProcessControl};
use crate::core::SchedulerError;

/// Pids launched here and not yet reaped.
type LivePids = Arc<Mutex<HashSet<Pid>>>;

/// Launches jobs as real child processes.
#[derive(Debug, Clone)]
pub struct UnixProcessControl {
    exits_tx: Sender<ExitEvent>,
    exits_rx: Receiver<ExitEvent>,
    live: LivePids,
}

impl Default for UnixProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl UnixProcessControl {
    /// Backend with an empty exit channel.
    #[must_use]
    pub fn new() -> Self {
        let (exits_tx, exits_rx) = unbounded();
        Self {
            exits_tx,
            exits_rx,
            live: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Deliver `signal` to a child that has not been reaped yet. The live set
    /// stays locked across `kill` so the reaper cannot release the pid
    /// mid-delivery.
    #[cfg(unix)]
    fn signal(&self, pid: Pid, signal: nix::sys::signal::Signal) -> Result<(), SchedulerError> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid as NixPid;

        let live = self.live.lock();
        if !live.contains(&pid) {
            return Err(SchedulerError::Signal {
                pid,
                reason: "process already reaped".into(),
            });
        }
        let raw = i32::try_from(pid).map_err(|_| SchedulerError::Signal {
            pid,
            reason: "pid out of range".into(),
        })?;
        kill(NixPid::from_raw(raw), signal).map_err(|errno| SchedulerError::Signal {
            pid,
            reason: errno.to_string(),
        })
    }
}

/// Wait for `child`, release its pid, and post the exit.
fn reap(mut child: Child, live: &Mutex<HashSet<Pid>>, exits: &Sender<ExitEvent>) {
    let pid = child.id();
    let status = if observe_exit(pid) {
        let mut live = live.lock();
        let status = child.wait();
        live.remove(&pid);
        status
    } else {
        let status = child.wait();
        live.lock().remove(&pid);
        status
    };
    let code = match status {
        Ok(status) => status.code(),
        Err(err) => {
            warn!(pid, error = %err, "wait on child failed");
            None
        }
    };
    if exits.send(ExitEvent::now(pid, code)).is_err() {
        debug!(pid, "exit observed after the scheduler hung up");
    }
}

/// Block until `pid` has exited but leave it unreaped. Returns `false` if the
/// exit could not be observed that way; the caller then reaps directly.
#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    all(target_os = "linux", not(target_env = "uclibc"))
))]
fn observe_exit(pid: Pid) -> bool {
    use nix::errno::Errno;
    use nix::sys::wait::{waitid, Id, WaitPidFlag};
    use nix::unistd::Pid as NixPid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    loop {
        match waitid(
            Id::Pid(NixPid::from_raw(raw)),
            WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT,
        ) {
            Ok(_) => return true,
            Err(Errno::EINTR) => {}
            Err(errno) => {
                debug!(pid, error = %errno, "waitid failed, reaping directly");
                return false;
            }
        }
    }
}

/// Without `waitid` the pid is released as soon as the child is reaped, so a
/// signal racing the exit may hit a reused pid.
#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    all(target_os = "linux", not(target_env = "uclibc"))
)))]
const fn observe_exit(_pid: Pid) -> bool {
    false
}

/// Kill and reap a child nobody will wait for.
fn abandon(mut child: Child) {
    let pid = child.id();
    if let Err(err) = child.kill() {
        warn!(pid, error = %err, "kill of abandoned child failed");
    }
    if let Err(err) = child.wait() {
        warn!(pid, error = %err, "wait on abandoned child failed");
    }
}

impl ProcessControl for UnixProcessControl {
    fn launch(&self, command: &str) -> Result<Pid, SchedulerError> {
        // The reaper starts first so a failed thread spawn launches nothing.
        let (handoff_tx, handoff_rx) = bounded::<Child>(1);
        let exits = self.exits_tx.clone();
        let live = Arc::clone(&self.live);
        thread::Builder::new()
            .name("reaper".into())
            .spawn(move || {
                if let Ok(child) = handoff_rx.recv() {
                    reap(child, &live, &exits);
                }
            })
            .map_err(|source| SchedulerError::Spawn {
                name: "reaper".into(),
                source,
            })?;

        let child = Command::new(command)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SchedulerError::Launch {
                command: command.to_string(),
                source,
            })?;
        let pid = child.id();
        self.live.lock().insert(pid);

        if let Err(SendError(child)) = handoff_tx.send(child) {
            self.live.lock().remove(&pid);
            error!(pid, command, "reaper gone before the child was handed over");
            abandon(child);
            return Err(SchedulerError::Spawn {
                name: format!("reaper-{pid}"),
                source: io::Error::other("reaper exited before taking the child"),
            });
        }

        debug!(pid, command, "child spawned");
        Ok(pid)
    }

    #[cfg(unix)]
    fn suspend(&self, pid: Pid) -> Result<(), SchedulerError> {
        self.signal(pid, nix::sys::signal::Signal::SIGSTOP)
    }

    #[cfg(unix)]
    fn resume(&self, pid: Pid) -> Result<(), SchedulerError> {
        self.signal(pid, nix::sys::signal::Signal::SIGCONT)
    }

    #[cfg(not(unix))]
    fn suspend(&self, pid: Pid) -> Result<(), SchedulerError> {
        Err(SchedulerError::Signal {
            pid,
            reason: "process suspension is not supported on this platform".into(),
        })
    }

    #[cfg(not(unix))]
    fn resume(&self, pid: Pid) -> Result<(), SchedulerError> {
        Err(SchedulerError::Signal {
            pid,
            reason: "process resumption is not supported on this platform".into(),
        })
    }

    fn exit_events(&self) -> Receiver<ExitEvent> {
        self.exits_rx.clone()
    }
}
