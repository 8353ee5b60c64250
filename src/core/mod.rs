//! Core scheduling: flights, admission queue, runway pool, dispatch workers.

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod flight;
pub mod queue;
pub mod runway;
pub mod scheduler;

pub use dispatcher::WorkerState;
pub use error::{AppResult, SchedulerError};
pub use events::{
    channel_sink, ChannelEventSink, EventSink, InMemoryEventSink, StatusChange, StatusEvent,
    TracingEventSink,
};
pub use flight::{Flight, FlightId, FlightKind, FlightStatus};
pub use queue::{AdmissionQueue, SLOT_TOLERANCE_MINUTES};
pub use runway::{RunwayId, RunwayPool};
pub use scheduler::{Scheduler, SchedulerStats};
