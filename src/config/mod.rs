//! Configuration models, command-line surface, and job file loading.

pub mod cli;
pub mod jobfile;
pub mod scheduler;

pub use cli::{CliArgs, PolicyCommand};
pub use jobfile::{load_job_file, parse_job_list};
pub use scheduler::{LaunchFailureMode, PolicyConfig, ReportFormat, SchedulerConfig};
