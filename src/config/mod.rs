//! Configuration model for runway counts, service times, and compression.

pub mod scheduler;

pub use scheduler::SchedulerConfig;
