//! Concrete backends for process control and report output.

pub mod process;
pub mod report;

pub use process::{SimulatedProcessControl, UnixProcessControl};
pub use report::{InMemoryReportSink, StdoutReportSink};
