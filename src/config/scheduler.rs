//! Scheduler configuration structures.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dispatch policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// First-come-first-served with core-budget admission.
    Fcfs,
    /// Round-robin with quantum preemption.
    RoundRobin {
        /// Quantum length in milliseconds.
        quantum_ms: u64,
    },
}

impl PolicyConfig {
    /// Short policy name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::RoundRobin { .. } => "RR",
        }
    }

    /// Quantum length, for round-robin.
    #[must_use]
    pub const fn quantum(&self) -> Option<Duration> {
        match self {
            Self::Fcfs => None,
            Self::RoundRobin { quantum_ms } => Some(Duration::from_millis(*quantum_ms)),
        }
    }
}

/// What to do when a job's process cannot be launched.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LaunchFailureMode {
    /// Stop admitting work, let running jobs finish, then fail the run.
    #[default]
    Abort,
    /// Report the job as failed and keep scheduling.
    Skip,
}

/// How the binary renders results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Per-job text blocks as jobs finish.
    #[default]
    Text,
    /// A single JSON summary at the end.
    Json,
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Dispatch policy.
    pub policy: PolicyConfig,
    /// Total core units; also the round-robin worker count.
    #[serde(default = "default_cores")]
    pub cores: u32,
    /// Job description file.
    pub job_file: PathBuf,
    /// Launch failure handling.
    #[serde(default)]
    pub launch_failure: LaunchFailureMode,
    /// Output rendering.
    #[serde(default)]
    pub report_format: ReportFormat,
}

const fn default_cores() -> u32 {
    1
}

impl SchedulerConfig {
    /// Configuration with defaults for everything but policy and job file.
    pub fn new(policy: PolicyConfig, job_file: impl Into<PathBuf>) -> Self {
        Self {
            policy,
            cores: default_cores(),
            job_file: job_file.into(),
            launch_failure: LaunchFailureMode::default(),
            report_format: ReportFormat::default(),
        }
    }

    /// Set the core count.
    #[must_use]
    pub const fn with_cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }

    /// Set the launch failure handling.
    #[must_use]
    pub const fn with_launch_failure(mut self, mode: LaunchFailureMode) -> Self {
        self.launch_failure = mode;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.cores == 0 {
            return Err("cores must be greater than 0".into());
        }
        if let PolicyConfig::RoundRobin { quantum_ms } = self.policy {
            if quantum_ms == 0 {
                return Err("quantum_ms must be greater than 0".into());
            }
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
