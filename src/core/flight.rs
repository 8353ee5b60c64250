//! Flight records: the unit of work requesting exclusive runway use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Caller-supplied flight identifier. Uniqueness is not enforced; only
/// dispatch order matters to the core.
pub type FlightId = u64;

/// Kind of runway service a flight requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightKind {
    /// Inbound flight requiring landing service.
    Arrival,
    /// Outbound flight requiring takeoff service.
    Departure,
}

impl FromStr for FlightKind {
    type Err = SchedulerError;

    /// Parse the enumerated kind strings used by the input collaborator.
    /// Anything else is rejected at this boundary and never reaches the core.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arrival" => Ok(Self::Arrival),
            "departure" => Ok(Self::Departure),
            other => Err(SchedulerError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for FlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrival => write!(f, "arrival"),
            Self::Departure => write!(f, "departure"),
        }
    }
}

/// Lifecycle status of a flight. Transitions are monotonic:
/// `Waiting -> Assigned -> Completed`, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    /// Accepted and waiting in the admission queue.
    Waiting,
    /// Claimed by a dispatcher and occupying a runway.
    Assigned,
    /// Service finished and the runway released.
    Completed,
}

/// One admission request for exclusive, time-bounded runway use.
///
/// Immutable after creation apart from `status`. Ownership is exclusive at
/// every stage: the queue owns a waiting flight, the dispatcher that pops it
/// owns it through service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Caller-supplied identifier.
    pub id: FlightId,
    /// Requested service kind.
    pub kind: FlightKind,
    /// Urgency; smaller numbers are served first.
    pub priority: u8,
    /// Requested time slot as minutes since midnight. Used for ordering and
    /// reporting only, never for absolute deadline enforcement.
    pub slot_minutes: u16,
    /// Current lifecycle status.
    pub status: FlightStatus,
}

impl Flight {
    /// Create a new flight in the `Waiting` state.
    #[must_use]
    pub const fn new(id: FlightId, kind: FlightKind, priority: u8, slot_minutes: u16) -> Self {
        Self {
            id,
            kind,
            priority,
            slot_minutes,
            status: FlightStatus::Waiting,
        }
    }
}
