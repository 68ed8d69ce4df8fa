//! Process-control backends.

pub mod simulated;
pub mod unix;

pub use simulated::SimulatedProcessControl;
pub use unix::UnixProcessControl;
