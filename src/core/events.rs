//! Status-change events delivered to the output collaborator.
//!
//! The core never formats human-readable text; it hands ordered
//! [`StatusEvent`] values to a single serialized [`EventSink`]. Sink access
//! is guarded by one mutex in the scheduler, so events from concurrent
//! workers never interleave.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::flight::FlightId;
use crate::core::runway::RunwayId;
use crate::util::clock::now_ms;

/// Kind of status transition reported by a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    /// A flight claimed a runway and service began.
    Assigned,
    /// Service finished and the runway was released.
    Completed,
    /// The dispatcher for this runway drained its work and terminated.
    RunwayShutdown,
}

/// A single ordered status-change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Milliseconds since the Unix epoch at emission time.
    pub timestamp_ms: u128,
    /// Flight the event refers to; `None` for runway-level events.
    pub flight_id: Option<FlightId>,
    /// Runway involved in the transition.
    pub runway_id: RunwayId,
    /// The transition itself.
    pub change: StatusChange,
}

impl StatusEvent {
    /// Build an event stamped with the current wall clock.
    #[must_use]
    pub fn now(flight_id: Option<FlightId>, runway_id: RunwayId, change: StatusChange) -> Self {
        Self {
            timestamp_ms: now_ms(),
            flight_id,
            runway_id,
            change,
        }
    }
}

/// Serialized sink receiving status events in emission order.
pub trait EventSink: Send {
    /// Record one event.
    fn record(&mut self, event: StatusEvent);
}

/// Bounded in-memory sink for tests and development. Oldest events are
/// dropped once the buffer is full.
pub struct InMemoryEventSink {
    events: VecDeque<StatusEvent>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Snapshot of stored events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.iter().cloned().collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, event: StatusEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards events into a single-consumer channel, letting an
/// external collaborator drain them without touching scheduler locks.
pub struct ChannelEventSink {
    tx: crossbeam_channel::Sender<StatusEvent>,
}

/// Create a channel-backed sink plus the receiver that drains it.
#[must_use]
pub fn channel_sink() -> (ChannelEventSink, crossbeam_channel::Receiver<StatusEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelEventSink { tx }, rx)
}

impl EventSink for ChannelEventSink {
    fn record(&mut self, event: StatusEvent) {
        // The receiver may already be gone during teardown; nothing to do.
        let _ = self.tx.send(event);
    }
}

/// Sink that logs events through `tracing` for quick diagnostics.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&mut self, event: StatusEvent) {
        info!(
            runway = event.runway_id,
            flight = event.flight_id,
            change = ?event.change,
            "status change"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_keeps_order_and_bound() {
        let mut sink = InMemoryEventSink::new(2);
        sink.record(StatusEvent::now(Some(1), 1, StatusChange::Assigned));
        sink.record(StatusEvent::now(Some(1), 1, StatusChange::Completed));
        sink.record(StatusEvent::now(None, 1, StatusChange::RunwayShutdown));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].change, StatusChange::Completed);
        assert_eq!(events[1].change, StatusChange::RunwayShutdown);
    }

    #[test]
    fn channel_sink_delivers_to_receiver() {
        let (mut sink, rx) = channel_sink();
        sink.record(StatusEvent::now(Some(9), 2, StatusChange::Assigned));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.flight_id, Some(9));
        assert_eq!(event.runway_id, 2);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (mut sink, rx) = channel_sink();
        drop(rx);
        sink.record(StatusEvent::now(None, 1, StatusChange::RunwayShutdown));
    }
}
