//! Shared utilities: clock, telemetry, input-boundary time parsing.

pub mod clock;
pub mod telemetry;
pub mod time;

pub use clock::*;
pub use telemetry::*;
pub use time::*;
