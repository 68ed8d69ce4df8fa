//! Text report sink writing job blocks to stdout as jobs finish.

use std::io::{self, Write};

use tracing::warn;

use crate::core::report::{FailedLaunch, JobReport, RejectedJob, ReportSink};

/// Writes each outcome to stdout as soon as it happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReportSink;

impl StdoutReportSink {
    fn emit(line: &dyn std::fmt::Display) {
        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(error = %err, "report write failed");
        }
    }
}

impl ReportSink for StdoutReportSink {
    fn completed(&mut self, report: &JobReport) {
        Self::emit(report);
    }

    fn rejected(&mut self, job: &RejectedJob) {
        Self::emit(job);
    }

    fn failed(&mut self, job: &FailedLaunch) {
        Self::emit(job);
    }
}
