//! Integration tests for the dispatch scheduler.
//!
//! These exercise the externally observable contract end to end:
//! - comparator order across concurrent workers
//! - per-runway mutual exclusion
//! - drain-then-stop shutdown, idempotency, fail-fast late submissions

use std::collections::HashMap;
use std::time::Instant;

use runway_dispatch::config::SchedulerConfig;
use runway_dispatch::core::{
    channel_sink, Flight, FlightKind, Scheduler, SchedulerError, StatusChange, StatusEvent,
    WorkerState,
};

/// Five-minute services compressed to 25ms of real time.
fn fast_config(runways: u32) -> SchedulerConfig {
    SchedulerConfig::new()
        .with_runway_count(runways)
        .with_landing_secs(300)
        .with_takeoff_secs(300)
        .with_time_compression(12_000)
}

fn run_to_completion(scheduler: &Scheduler) {
    scheduler.start().unwrap();
    scheduler.shutdown();
}

fn assigned_ids(events: &[StatusEvent]) -> Vec<u64> {
    events
        .iter()
        .filter(|e| e.change == StatusChange::Assigned)
        .filter_map(|e| e.flight_id)
        .collect()
}

fn completed_ids(events: &[StatusEvent]) -> Vec<u64> {
    events
        .iter()
        .filter(|e| e.change == StatusChange::Completed)
        .filter_map(|e| e.flight_id)
        .collect()
}

#[test]
fn two_runway_scenario_dispatches_by_priority() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(2), Box::new(sink)).unwrap();

    // Priority 1 flights at 09:00 and 09:03 are within the tolerance window
    // and outrank the priority 2 departure despite its equal slot.
    scheduler.submit(Flight::new(1, FlightKind::Arrival, 1, 9 * 60)).unwrap();
    scheduler.submit(Flight::new(2, FlightKind::Departure, 2, 9 * 60)).unwrap();
    scheduler.submit(Flight::new(3, FlightKind::Arrival, 1, 9 * 60 + 3)).unwrap();
    run_to_completion(&scheduler);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    let assigned = assigned_ids(&events);
    assert_eq!(assigned.len(), 3);
    // Flights 1 and 3 occupy both runways first; emission order between the
    // two workers is not fixed.
    let mut first_wave = vec![assigned[0], assigned[1]];
    first_wave.sort_unstable();
    assert_eq!(first_wave, vec![1, 3]);
    assert_eq!(assigned[2], 2);

    let mut completed = completed_ids(&events);
    completed.sort_unstable();
    assert_eq!(completed, vec![1, 2, 3]);
}

#[test]
fn single_runway_serves_strict_comparator_order() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(1), Box::new(sink)).unwrap();

    // All within one tolerance window: priority ascending decides.
    scheduler.submit(Flight::new(10, FlightKind::Departure, 4, 540)).unwrap();
    scheduler.submit(Flight::new(11, FlightKind::Arrival, 1, 541)).unwrap();
    scheduler.submit(Flight::new(12, FlightKind::Arrival, 3, 542)).unwrap();
    scheduler.submit(Flight::new(13, FlightKind::Departure, 2, 543)).unwrap();
    run_to_completion(&scheduler);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    assert_eq!(assigned_ids(&events), vec![11, 13, 12, 10]);
    assert_eq!(completed_ids(&events), vec![11, 13, 12, 10]);
}

#[test]
fn preempting_tier_outranks_priority() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(1), Box::new(sink)).unwrap();

    scheduler.submit(Flight::new(1, FlightKind::Arrival, 0, 540)).unwrap();
    scheduler.submit_preempting(Flight::new(2, FlightKind::Arrival, 9, 540)).unwrap();
    run_to_completion(&scheduler);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    assert_eq!(assigned_ids(&events), vec![2, 1]);
}

#[test]
fn empty_shutdown_returns_immediately() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(2), Box::new(sink)).unwrap();
    scheduler.start().unwrap();

    let begin = Instant::now();
    scheduler.shutdown();
    assert!(begin.elapsed().as_secs() < 1);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    assert!(assigned_ids(&events).is_empty());
    let shutdowns = events
        .iter()
        .filter(|e| e.change == StatusChange::RunwayShutdown)
        .count();
    assert_eq!(shutdowns, 2);
}

#[test]
fn shutdown_is_idempotent() {
    let (sink, _rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(2), Box::new(sink)).unwrap();
    scheduler.submit(Flight::new(1, FlightKind::Arrival, 1, 540)).unwrap();
    scheduler.start().unwrap();

    scheduler.shutdown();
    let begin = Instant::now();
    scheduler.shutdown();
    assert!(begin.elapsed().as_millis() < 100);

    assert!(scheduler
        .worker_states()
        .iter()
        .all(|s| *s == WorkerState::Terminated));
}

#[test]
fn submit_after_shutdown_is_rejected() {
    let (sink, _rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(1), Box::new(sink)).unwrap();
    scheduler.start().unwrap();
    scheduler.shutdown();

    let err = scheduler
        .submit(Flight::new(5, FlightKind::Arrival, 1, 540))
        .unwrap_err();
    assert_eq!(err, SchedulerError::QueueClosed);
    let err = scheduler
        .submit_preempting(Flight::new(5, FlightKind::Arrival, 1, 540))
        .unwrap_err();
    assert_eq!(err, SchedulerError::QueueClosed);
}

#[test]
fn shuffled_submission_still_serves_priority_order() {
    use rand::seq::SliceRandom;

    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(1), Box::new(sink)).unwrap();

    // Distinct priorities, all inside one tolerance window: the dispatch
    // order must be priority-ascending no matter the submission order.
    let mut flights: Vec<Flight> = (0u8..10)
        .map(|p| Flight::new(100 + u64::from(p), FlightKind::Arrival, p, 600 + u16::from(p % 5)))
        .collect();
    flights.shuffle(&mut rand::rng());
    for flight in flights {
        scheduler.submit(flight).unwrap();
    }
    run_to_completion(&scheduler);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    assert_eq!(assigned_ids(&events), (100..110).collect::<Vec<_>>());
}

#[test]
fn shutdown_drains_every_accepted_flight() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(2), Box::new(sink)).unwrap();

    for id in 0..10 {
        let kind = if id % 2 == 0 { FlightKind::Arrival } else { FlightKind::Departure };
        scheduler
            .submit(Flight::new(id, kind, u8::try_from(id % 5).unwrap(), 540))
            .unwrap();
    }
    run_to_completion(&scheduler);

    let events: Vec<StatusEvent> = rx.try_iter().collect();
    let mut completed = completed_ids(&events);
    completed.sort_unstable();
    // Every accepted flight completed exactly once.
    assert_eq!(completed, (0..10).collect::<Vec<_>>());

    let stats = scheduler.stats();
    assert_eq!(stats.submitted, 10);
    assert_eq!(stats.completed, 10);
    assert_eq!(stats.queued, 0);
    assert_eq!(stats.degraded_runways, 0);
}

#[test]
fn runways_never_overlap_services() {
    let (sink, rx) = channel_sink();
    let scheduler = Scheduler::new(fast_config(2), Box::new(sink)).unwrap();

    for id in 0..8 {
        scheduler.submit(Flight::new(id, FlightKind::Arrival, 1, 540)).unwrap();
    }
    run_to_completion(&scheduler);

    // The sink serializes emissions, so per-runway event order is the
    // acquire/release interval order. A runway must strictly alternate
    // Assigned / Completed, finishing with its shutdown notice.
    let events: Vec<StatusEvent> = rx.try_iter().collect();
    let mut per_runway: HashMap<u32, Vec<StatusChange>> = HashMap::new();
    for event in &events {
        per_runway.entry(event.runway_id).or_default().push(event.change);
    }

    assert_eq!(per_runway.len(), 2);
    for (runway, changes) in per_runway {
        assert_eq!(*changes.last().unwrap(), StatusChange::RunwayShutdown, "runway {runway}");
        let services = &changes[..changes.len() - 1];
        assert_eq!(services.len() % 2, 0, "runway {runway}");
        for pair in services.chunks(2) {
            assert_eq!(pair[0], StatusChange::Assigned, "runway {runway}");
            assert_eq!(pair[1], StatusChange::Completed, "runway {runway}");
        }
    }
}
