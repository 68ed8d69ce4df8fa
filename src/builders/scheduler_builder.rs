//! Assemble a [`Scheduler`] from configuration.

use std::sync::Arc;

use tracing::warn;

use crate::config::{ReportFormat, SchedulerConfig};
use crate::core::audit::AuditSink;
use crate::core::process::ProcessControl;
use crate::core::report::ReportSink;
use crate::core::{Scheduler, SchedulerError};
use crate::infra::{StdoutReportSink, UnixProcessControl};
use crate::util::clock::Clock;

/// Builder for [`Scheduler`].
///
/// Defaults: real child processes, and per-job text blocks on stdout when the
/// configured format is text.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    control: Option<Arc<dyn ProcessControl>>,
    reports: Option<Box<dyn ReportSink>>,
    audit: Option<Box<dyn AuditSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SchedulerBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            control: None,
            reports: None,
            audit: None,
            clock: None,
        }
    }

    /// Use a specific process backend.
    #[must_use]
    pub fn with_control(mut self, control: Arc<dyn ProcessControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Send outcomes to `sink` instead of the format default.
    #[must_use]
    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.reports = Some(sink);
        self
    }

    /// Record lifecycle transitions into `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and build the driver.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if validation fails.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        let host_cpus = num_cpus::get();
        if usize::try_from(self.config.cores).is_ok_and(|cores| cores > host_cpus) {
            warn!(
                cores = self.config.cores,
                host_cpus, "configured cores exceed host CPUs"
            );
        }

        let control = self
            .control
            .unwrap_or_else(|| Arc::new(UnixProcessControl::new()));
        let report_format = self.config.report_format;
        let mut scheduler = Scheduler::new(self.config, control)?;

        match (self.reports, report_format) {
            (Some(sink), _) => scheduler = scheduler.with_report_sink(sink),
            (None, ReportFormat::Text) => {
                scheduler = scheduler.with_report_sink(Box::new(StdoutReportSink));
            }
            (None, ReportFormat::Json) => {}
        }
        if let Some(audit) = self.audit {
            scheduler = scheduler.with_audit(audit);
        }
        if let Some(clock) = self.clock {
            scheduler = scheduler.with_clock(clock);
        }
        Ok(scheduler)
    }
}
