//! Command-line surface of the `scheduler` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{LaunchFailureMode, PolicyConfig, ReportFormat, SchedulerConfig};
use crate::core::SchedulerError;

/// Multi-core process scheduler.
///
/// Launches every executable listed in the job file and dispatches them
/// first-come-first-served or round-robin across the configured cores.
#[derive(Parser, Debug)]
#[command(name = "scheduler", about = "Multi-core FCFS / round-robin process scheduler")]
pub struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, global = true)]
    pub format: ReportFormat,

    /// Behavior when a job cannot be launched.
    #[arg(long = "on-launch-failure", value_enum, default_value_t = LaunchFailureMode::Abort, global = true)]
    pub launch_failure: LaunchFailureMode,

    /// Scheduling policy.
    #[command(subcommand)]
    pub policy: PolicyCommand,
}

/// Policy selection and its positional arguments.
#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// First-come-first-served: scheduler FCFS <jobfile> [numCores]
    #[command(name = "FCFS")]
    Fcfs {
        /// Job description file.
        job_file: PathBuf,
        /// Total cores.
        #[arg(env = "SCHED_CORES", default_value_t = 1)]
        cores: u32,
    },
    /// Round-robin: scheduler RR <quantum_ms> <jobfile> [numCores]
    #[command(name = "RR")]
    Rr {
        /// Quantum in milliseconds.
        quantum_ms: u64,
        /// Job description file.
        job_file: PathBuf,
        /// Total cores and number of dispatch workers.
        #[arg(env = "SCHED_CORES", default_value_t = 1)]
        cores: u32,
    },
}

impl CliArgs {
    /// Convert parsed arguments into a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Usage`] when values are out of range.
    pub fn into_config(self) -> Result<SchedulerConfig, SchedulerError> {
        let (policy, job_file, cores) = match self.policy {
            PolicyCommand::Fcfs { job_file, cores } => (PolicyConfig::Fcfs, job_file, cores),
            PolicyCommand::Rr {
                quantum_ms,
                job_file,
                cores,
            } => (PolicyConfig::RoundRobin { quantum_ms }, job_file, cores),
        };
        let config = SchedulerConfig {
            policy,
            cores,
            job_file,
            launch_failure: self.launch_failure,
            report_format: self.format,
        };
        config.validate().map_err(SchedulerError::Usage)?;
        Ok(config)
    }
}
