//! Tests for configuration validation

use std::time::Duration;

use pretty_assertions::assert_eq;
use procsched::config::{LaunchFailureMode, PolicyConfig, ReportFormat, SchedulerConfig};

#[test]
fn test_scheduler_config_validation() {
    let valid = SchedulerConfig::new(PolicyConfig::Fcfs, "jobs.txt").with_cores(4);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_cores() {
    let invalid = SchedulerConfig::new(PolicyConfig::Fcfs, "jobs.txt").with_cores(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_quantum() {
    let invalid = SchedulerConfig::new(PolicyConfig::RoundRobin { quantum_ms: 0 }, "jobs.txt");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_round_robin() {
    let cfg = SchedulerConfig::from_json_str(
        r#"{
            "policy": { "kind": "round_robin", "quantum_ms": 200 },
            "cores": 3,
            "job_file": "work.txt",
            "launch_failure": "skip",
            "report_format": "json"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.policy.quantum(), Some(Duration::from_millis(200)));
    assert_eq!(cfg.policy.name(), "RR");
    assert_eq!(cfg.cores, 3);
    assert_eq!(cfg.launch_failure, LaunchFailureMode::Skip);
    assert_eq!(cfg.report_format, ReportFormat::Json);
}

#[test]
fn test_from_json_rejects_invalid_values() {
    assert!(SchedulerConfig::from_json_str(
        r#"{ "policy": { "kind": "fcfs" }, "cores": 0, "job_file": "x" }"#
    )
    .is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_defaults() {
    let cfg = SchedulerConfig::new(PolicyConfig::Fcfs, "jobs.txt");
    assert_eq!(cfg.cores, 1);
    assert_eq!(cfg.launch_failure, LaunchFailureMode::Abort);
    assert_eq!(cfg.report_format, ReportFormat::Text);
    assert_eq!(cfg.policy.name(), "FCFS");
}
