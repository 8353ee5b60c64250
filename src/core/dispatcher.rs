//! Per-runway dispatch workers.
//!
//! One named OS thread per runway blocks on the admission queue (no
//! polling), claims its bound runway for the compressed service duration,
//! releases it, and emits status events. A worker that finds its bound
//! runway already occupied has hit an ordering bug: it retires the runway
//! and terminates alone, leaving the pool degraded instead of hung.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::config::SchedulerConfig;
use crate::core::events::{EventSink, StatusChange, StatusEvent};
use crate::core::flight::{FlightId, FlightStatus};
use crate::core::queue::AdmissionQueue;
use crate::core::runway::{RunwayId, RunwayPool};

/// Observable dispatcher lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Not yet running.
    Idle = 0,
    /// Blocked on the admission queue.
    WaitingForWork = 1,
    /// Holding a runway for a service duration.
    Servicing = 2,
    /// Shutdown observed with the queue drained; about to exit.
    Draining = 3,
    /// Loop exited.
    Terminated = 4,
}

/// Lock-free cell publishing a worker's current state for observers.
pub struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Idle as u8))
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Current state snapshot.
    #[must_use]
    pub fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            1 => WorkerState::WaitingForWork,
            2 => WorkerState::Servicing,
            3 => WorkerState::Draining,
            4 => WorkerState::Terminated,
            _ => WorkerState::Idle,
        }
    }
}

/// Lock-free counters shared between the facade and its workers.
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub degraded: AtomicU64,
}

/// Everything a dispatcher thread needs, cloned per worker.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub queue: Arc<AdmissionQueue>,
    pub pool: Arc<RunwayPool>,
    pub sink: Arc<Mutex<Box<dyn EventSink>>>,
    pub counters: Arc<DispatchCounters>,
    pub config: SchedulerConfig,
}

fn emit(ctx: &WorkerContext, flight_id: Option<FlightId>, runway_id: RunwayId, change: StatusChange) {
    // Stamp under the sink lock so timestamps follow emission order.
    let mut sink = ctx.sink.lock();
    sink.record(StatusEvent::now(flight_id, runway_id, change));
}

/// Spawn the dispatcher thread bound to `runway_id`.
pub(crate) fn spawn_dispatcher(
    runway_id: RunwayId,
    ctx: WorkerContext,
    state: Arc<StateCell>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("runway-{runway_id}"))
        .spawn(move || run_dispatcher(runway_id, &ctx, &state))
        .expect("failed to spawn dispatcher thread")
}

fn run_dispatcher(runway_id: RunwayId, ctx: &WorkerContext, state: &StateCell) {
    debug!(runway = runway_id, "dispatcher started");

    loop {
        state.set(WorkerState::WaitingForWork);
        let Some(mut flight) = ctx.queue.take_next() else {
            // Closed and drained: the termination signal.
            state.set(WorkerState::Draining);
            emit(ctx, None, runway_id, StatusChange::RunwayShutdown);
            break;
        };

        // A bound runway is free whenever its worker is not servicing, so a
        // failed claim means some other thread occupies this slot: an
        // ordering bug, fatal for this worker only.
        match ctx.pool.try_acquire(runway_id) {
            Ok(true) => {}
            Ok(false) => {
                error!(
                    runway = runway_id,
                    flight = flight.id,
                    "bound runway already occupied; retiring it"
                );
                ctx.counters.degraded.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = ctx.pool.retire(runway_id) {
                    error!(runway = runway_id, error = %e, "retire failed");
                }
                // Hand the claimed flight to a healthy worker.
                ctx.queue.reinstate(flight);
                break;
            }
            Err(e) => {
                error!(runway = runway_id, error = %e, "dispatcher bound to unknown runway");
                ctx.counters.degraded.fetch_add(1, Ordering::Relaxed);
                ctx.queue.reinstate(flight);
                break;
            }
        }

        flight.status = FlightStatus::Assigned;
        emit(ctx, Some(flight.id), runway_id, StatusChange::Assigned);

        let service = ctx.config.service_duration(flight.kind);
        debug!(
            runway = runway_id,
            flight = flight.id,
            kind = %flight.kind,
            priority = flight.priority,
            service_ms = u64::try_from(service.as_millis()).unwrap_or(u64::MAX),
            "servicing"
        );
        state.set(WorkerState::Servicing);
        // Suspend with no lock held; submitters and other workers proceed.
        thread::sleep(service);

        if let Err(e) = ctx.pool.release(runway_id) {
            // Reported, non-fatal.
            warn!(runway = runway_id, error = %e, "release ignored");
        }

        flight.status = FlightStatus::Completed;
        ctx.counters.completed.fetch_add(1, Ordering::Relaxed);
        emit(ctx, Some(flight.id), runway_id, StatusChange::Completed);
    }

    state.set(WorkerState::Terminated);
    debug!(runway = runway_id, "dispatcher exiting");
}
