//! # procsched
//!
//! A multi-core process scheduler. It reads a workload of executables from a
//! job file, launches each as an operating-system process, and dispatches
//! them under one of two policies while keeping a shared core budget
//! balanced:
//!
//! - **FCFS**: every queued job whose cores fit the free budget is launched
//!   in submission order; the dispatcher then blocks until a process exits.
//! - **Round-robin**: a pool of dispatch workers (one per core) each run a
//!   job for one quantum, suspend it with `SIGSTOP`, and send it to the back
//!   of the queue; `SIGCONT` resumes it on its next turn.
//!
//! Process exits arrive asynchronously on a channel and are reconciled with
//! the queue under one lock, so a job is never resumed after it has exited
//! and its cores are credited back exactly once.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use procsched::builders::SchedulerBuilder;
//! use procsched::config::{PolicyConfig, SchedulerConfig};
//! use procsched::core::JobSpec;
//! use procsched::infra::SimulatedProcessControl;
//!
//! let control = SimulatedProcessControl::new()
//!     .with_program("./a", Duration::from_millis(300))
//!     .with_program("./b", Duration::from_millis(100));
//! let config = SchedulerConfig::new(PolicyConfig::RoundRobin { quantum_ms: 100 }, "jobs.txt")
//!     .with_cores(2);
//! let scheduler = SchedulerBuilder::new(config)
//!     .with_control(Arc::new(control))
//!     .build()?;
//! let summary = scheduler.run(vec![JobSpec::new("./a"), JobSpec::new("./b")])?;
//! println!("WORKLOAD TIME: {:.2} secs", summary.workload_secs);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Builders to construct scheduler drivers from configuration.
pub mod builders;
/// Configuration models, command-line surface, and job file loading.
pub mod config;
/// Core scheduling abstractions, dispatch policies, and core-budget accounting.
pub mod core;
/// Process-control and report backends.
pub mod infra;
/// Shared utilities.
pub mod util;
