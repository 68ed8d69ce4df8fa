//! Job file loading.
//!
//! The file is a stream of whitespace-separated tokens. Each non-numeric
//! token names an executable and starts a new job; an integer directly after
//! it is that job's core requirement, otherwise the job needs one core.

use std::path::Path;

use crate::core::{JobSpec, SchedulerError};

/// Parse a job list from text.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidJob`] for a core count below one or a
/// core count that does not follow an executable.
pub fn parse_job_list(input: &str) -> Result<Vec<JobSpec>, SchedulerError> {
    let mut jobs = Vec::new();
    let mut pending: Option<JobSpec> = None;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        for token in line.split_whitespace() {
            let Ok(cores) = token.parse::<i64>() else {
                jobs.extend(pending.replace(JobSpec::new(token)));
                continue;
            };
            let Some(spec) = pending.take() else {
                return Err(SchedulerError::InvalidJob {
                    line: line_no,
                    reason: format!("core count {cores} without an executable"),
                });
            };
            let cores = u32::try_from(cores)
                .ok()
                .filter(|&c| c >= 1)
                .ok_or_else(|| SchedulerError::InvalidJob {
                    line: line_no,
                    reason: format!("{} requests {cores} cores", spec.command),
                })?;
            jobs.push(spec.with_cores(cores));
        }
    }
    jobs.extend(pending);
    Ok(jobs)
}

/// Read and parse a job file.
///
/// # Errors
///
/// Returns [`SchedulerError::Input`] if the file cannot be read, or a parse
/// error from [`parse_job_list`].
pub fn load_job_file(path: &Path) -> Result<Vec<JobSpec>, SchedulerError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchedulerError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let jobs = parse_job_list(&text)?;
    tracing::debug!(path = %path.display(), jobs = jobs.len(), "job file loaded");
    Ok(jobs)
}
