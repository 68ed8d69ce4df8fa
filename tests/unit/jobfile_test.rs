//! Tests for job file loading

use std::io::Write;

use pretty_assertions::assert_eq;
use procsched::config::{load_job_file, parse_job_list};
use procsched::core::{JobSpec, SchedulerError};
use proptest::prelude::*;

#[test]
fn test_paths_with_optional_cores() {
    let jobs = parse_job_list("./a 2\n./b\n./c 1\n").unwrap();
    assert_eq!(
        jobs,
        vec![
            JobSpec::new("./a").with_cores(2),
            JobSpec::new("./b"),
            JobSpec::new("./c"),
        ]
    );
}

#[test]
fn test_tokens_may_share_lines() {
    let jobs = parse_job_list("./a ./b 3 ./c").unwrap();
    assert_eq!(
        jobs,
        vec![
            JobSpec::new("./a"),
            JobSpec::new("./b").with_cores(3),
            JobSpec::new("./c"),
        ]
    );
}

#[test]
fn test_zero_cores_is_invalid() {
    let err = parse_job_list("./a\n./b 0\n").unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidJob { line: 2, .. }));
}

#[test]
fn test_leading_number_is_invalid() {
    let err = parse_job_list("4 ./a").unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidJob { line: 1, .. }));
}

#[test]
fn test_empty_input_is_empty_workload() {
    assert!(parse_job_list("").unwrap().is_empty());
    assert!(parse_job_list("  \n\t\n").unwrap().is_empty());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "/bin/true 1").unwrap();
    writeln!(file, "/bin/false").unwrap();
    file.flush().unwrap();

    let jobs = load_job_file(file.path()).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].command, "/bin/false");
}

#[test]
fn test_missing_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_job_file(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, SchedulerError::Input { .. }));
}

fn command() -> impl Strategy<Value = String> {
    "[./a-z][a-z_/]{0,12}"
}

proptest! {
    #[test]
    fn prop_rendered_jobs_parse_back(specs in prop::collection::vec((command(), 1u32..16), 0..20)) {
        let text: String = specs
            .iter()
            .map(|(cmd, cores)| format!("{cmd} {cores}\n"))
            .collect();
        let jobs = parse_job_list(&text).unwrap();
        prop_assert_eq!(jobs.len(), specs.len());
        for (job, (cmd, cores)) in jobs.iter().zip(&specs) {
            prop_assert_eq!(&job.command, cmd);
            prop_assert_eq!(job.cores, *cores);
        }
    }

    #[test]
    fn prop_parser_never_panics(input in "\\PC{0,64}") {
        let _ = parse_job_list(&input);
    }
}
