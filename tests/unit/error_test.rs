//! Tests for error types

use std::io;
use std::path::PathBuf;

use procsched::core::SchedulerError;

#[test]
fn test_usage_error() {
    let err = SchedulerError::Usage("missing job file".to_string());
    assert_eq!(format!("{err}"), "invalid usage: missing job file");
}

#[test]
fn test_input_error_names_path() {
    let err = SchedulerError::Input {
        path: PathBuf::from("/tmp/jobs.txt"),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    };
    assert_eq!(format!("{err}"), "invalid input file /tmp/jobs.txt: not found");
}

#[test]
fn test_invalid_job_error() {
    let err = SchedulerError::InvalidJob {
        line: 3,
        reason: "./a requests 0 cores".to_string(),
    };
    assert_eq!(format!("{err}"), "invalid job at line 3: ./a requests 0 cores");
}

#[test]
fn test_launch_error() {
    let err = SchedulerError::Launch {
        command: "./nope".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
    };
    assert_eq!(
        format!("{err}"),
        "failed to launch ./nope: No such file or directory"
    );
}

#[test]
fn test_resource_overflow_error() {
    let err = SchedulerError::ResourceOverflow {
        command: "./big".to_string(),
        required: 8,
        total: 4,
    };
    assert_eq!(
        format!("{err}"),
        "./big requires 8 cores but only 4 are configured"
    );
}

#[test]
fn test_runtime_errors() {
    assert_eq!(
        format!("{}", SchedulerError::UnknownProcess(42)),
        "unknown process 42"
    );
    assert_eq!(
        format!("{}", SchedulerError::WorkerPanicked(1)),
        "dispatch worker 1 panicked"
    );
    assert_eq!(
        format!("{}", SchedulerError::Stalled { queued: 2 }),
        "scheduler stalled with 2 queued jobs"
    );
}

#[test]
fn test_converts_into_anyhow() {
    let res: procsched::core::AppResult<()> =
        Err(SchedulerError::InvalidConfig("cores must be greater than 0".into()).into());
    let msg = format!("{}", res.unwrap_err());
    assert!(msg.contains("cores must be greater than 0"));
}
