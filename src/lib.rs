//! # Runway Dispatch
//!
//! A concurrent dispatch scheduler that allocates a fixed pool of
//! interchangeable runways to a stream of prioritized, time-tagged flight
//! requests.
//!
//! Flights enter a priority-ordered admission queue; one dispatcher worker
//! per runway blocks on the queue, claims its runway for the simulated
//! service duration, releases it, and reports every status transition to a
//! serialized event sink. Shutdown drains the queue completely before any
//! worker terminates, so no accepted flight is ever abandoned.
//!
//! ## Key pieces
//!
//! - **Admission queue**: two-tier blocking priority queue. Within a
//!   5-simulated-minute tolerance window flights contend by priority alone;
//!   outside it the earlier slot wins. A preempting tier is always drained
//!   before the regular tier.
//! - **Runway pool**: fixed slot set with atomic try-acquire, notify-on-release,
//!   and degraded-mode retirement of misbehaving slots.
//! - **Dispatcher workers**: one named OS thread per runway, blocking on the
//!   queue with no polling. Service suspension holds no lock.
//! - **Scheduler facade**: owns everything, exposes `start`/`submit`/`shutdown`.
//!   `shutdown` is idempotent and joins every worker.
//!
//! ```rust,no_run
//! use runway_dispatch::config::SchedulerConfig;
//! use runway_dispatch::core::{channel_sink, Flight, FlightKind, Scheduler};
//!
//! let (sink, events) = channel_sink();
//! let scheduler = Scheduler::new(SchedulerConfig::new().with_runway_count(2), Box::new(sink))?;
//! scheduler.start()?;
//! scheduler.submit(Flight::new(1, FlightKind::Arrival, 1, 9 * 60))?;
//! scheduler.shutdown();
//! for event in events.try_iter() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), runway_dispatch::core::SchedulerError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: flights, admission queue, runway pool, dispatch workers.
pub mod core;
/// Configuration model for runway counts, service times, and compression.
pub mod config;
/// Shared utilities: clock, telemetry, input-boundary time parsing.
pub mod util;
