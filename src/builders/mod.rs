//! Builders to construct scheduler drivers from configuration.

pub mod scheduler_builder;

pub use scheduler_builder::SchedulerBuilder;
