//! Tests for builder modules

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use procsched::builders::SchedulerBuilder;
use procsched::config::{PolicyConfig, ReportFormat, SchedulerConfig};
use procsched::core::{JobSpec, SchedulerError};
use procsched::infra::{InMemoryReportSink, SimulatedProcessControl};
use procsched::util::Clock;

struct CountingClock {
    calls: Mutex<usize>,
}

impl Clock for CountingClock {
    fn now(&self) -> Instant {
        *self.calls.lock() += 1;
        Instant::now()
    }
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = SchedulerConfig::new(PolicyConfig::Fcfs, "jobs.txt").with_cores(0);
    let result = SchedulerBuilder::new(config).build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_builder_keeps_config() {
    let config = SchedulerConfig::new(PolicyConfig::RoundRobin { quantum_ms: 40 }, "jobs.txt")
        .with_cores(3);
    let scheduler = SchedulerBuilder::new(config.clone())
        .with_control(Arc::new(SimulatedProcessControl::new()))
        .build()
        .unwrap();
    assert_eq!(scheduler.config(), &config);
}

#[test]
fn test_builder_wires_control_sink_and_clock() {
    let control = SimulatedProcessControl::new().with_program("job", Duration::from_millis(5));
    let reports = Arc::new(Mutex::new(InMemoryReportSink::new()));
    let clock = Arc::new(CountingClock {
        calls: Mutex::new(0),
    });
    let mut config = SchedulerConfig::new(PolicyConfig::Fcfs, "jobs.txt");
    config.report_format = ReportFormat::Json;

    let scheduler = SchedulerBuilder::new(config)
        .with_control(Arc::new(control.clone()))
        .with_report_sink(Box::new(Arc::clone(&reports)))
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build()
        .unwrap();
    let summary = scheduler.run(vec![JobSpec::new("job")]).unwrap();

    assert_eq!(summary.reports.len(), 1);
    assert_eq!(reports.lock().reports().len(), 1);
    assert_eq!(control.launch_order(), vec!["job".to_string()]);
    assert!(*clock.calls.lock() >= 3);
}
