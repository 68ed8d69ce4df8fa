//! Report sinks.

pub mod memory;
pub mod stdout;

pub use memory::InMemoryReportSink;
pub use stdout::StdoutReportSink;
