//! `scheduler` binary: parse arguments, load the job file, run the workload,
//! print the report.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use procsched::builders::SchedulerBuilder;
use procsched::config::{load_job_file, CliArgs, ReportFormat};
use procsched::core::AppResult;
use procsched::util::init_tracing;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = CliArgs::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "scheduler failed");
            eprintln!("scheduler: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every job launched.
fn run(args: CliArgs) -> AppResult<bool> {
    let config = args.into_config()?;
    let jobs = load_job_file(&config.job_file)
        .with_context(|| format!("loading jobs from {}", config.job_file.display()))?;
    let format = config.report_format;
    info!(policy = config.policy.name(), jobs = jobs.len(), "starting");

    let scheduler = SchedulerBuilder::new(config)
        .build()
        .context("building scheduler")?;
    let summary = scheduler.run(jobs)?;

    match format {
        ReportFormat::Text => {
            println!("WORKLOAD TIME: {:.2} secs", summary.workload_secs);
            println!("scheduler exits");
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(summary.failed.is_empty())
}
