//! Error types for scheduler operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::process::Pid;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Missing or malformed command-line arguments.
    #[error("invalid usage: {0}")]
    Usage(String),
    /// The job file could not be read.
    #[error("invalid input file {}: {source}", path.display())]
    Input {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// A job description could not be parsed.
    #[error("invalid job at line {line}: {reason}")]
    InvalidJob {
        /// 1-based line number in the job file.
        line: usize,
        /// What was wrong with the entry.
        reason: String,
    },
    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The process launcher could not start a job.
    #[error("failed to launch {command}: {source}")]
    Launch {
        /// Executable path of the job.
        command: String,
        /// Underlying spawn failure.
        source: std::io::Error,
    },
    /// Suspend or resume could not be delivered.
    #[error("failed to signal process {pid}: {reason}")]
    Signal {
        /// Target process.
        pid: Pid,
        /// Reason reported by the signal mechanism.
        reason: String,
    },
    /// A process id that the scheduler does not track.
    #[error("unknown process {0}")]
    UnknownProcess(Pid),
    /// The job needs more cores than the scheduler was configured with.
    #[error("{command} requires {required} cores but only {total} are configured")]
    ResourceOverflow {
        /// Executable path of the job.
        command: String,
        /// Cores the job asked for.
        required: u32,
        /// Total configured cores.
        total: u32,
    },
    /// A dispatch or completion thread could not be started.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying OS failure.
        source: std::io::Error,
    },
    /// The exit notification channel closed while processes were outstanding.
    #[error("exit notification channel closed with {outstanding} processes outstanding")]
    ExitChannelClosed {
        /// Processes still registered.
        outstanding: usize,
    },
    /// A dispatch worker thread panicked.
    #[error("dispatch worker {0} panicked")]
    WorkerPanicked(usize),
    /// Jobs are queued but nothing is running and nothing can be admitted.
    #[error("scheduler stalled with {queued} queued jobs")]
    Stalled {
        /// Number of jobs left in the queue.
        queued: usize,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
