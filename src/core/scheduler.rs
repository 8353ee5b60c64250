//! Scheduler facade: owns the queue, the pool, and the dispatcher workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::core::dispatcher::{
    spawn_dispatcher, DispatchCounters, StateCell, WorkerContext, WorkerState,
};
use crate::core::events::EventSink;
use crate::core::flight::Flight;
use crate::core::queue::AdmissionQueue;
use crate::core::runway::{RunwayId, RunwayPool};
use crate::core::SchedulerError;

/// Snapshot of scheduler counters and pool occupancy.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    /// Configured runway slots.
    pub runway_count: usize,
    /// Slots currently free.
    pub available_runways: usize,
    /// Slots permanently retired after an internal invariant violation.
    pub degraded_runways: u64,
    /// Flights accepted by `submit` since construction.
    pub submitted: u64,
    /// Flights that finished service.
    pub completed: u64,
    /// Flights waiting in the admission queue.
    pub queued: usize,
}

/// Owns N dispatcher workers (N = runway count) plus the shared queue and
/// pool. Multiple schedulers coexist freely; there is no process-wide state.
///
/// Lifecycle: [`new`](Scheduler::new) -> [`start`](Scheduler::start) ->
/// any number of [`submit`](Scheduler::submit) calls ->
/// [`shutdown`](Scheduler::shutdown). Shutdown drains every accepted flight
/// before returning; it is the one externally observable synchronization
/// point guaranteeing no flight is left behind.
pub struct Scheduler {
    config: SchedulerConfig,
    queue: Arc<AdmissionQueue>,
    pool: Arc<RunwayPool>,
    sink: Arc<Mutex<Box<dyn EventSink>>>,
    counters: Arc<DispatchCounters>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_states: Mutex<Vec<Arc<StateCell>>>,
    started: AtomicBool,
    shutdown: AtomicBool,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler from a validated configuration and an event sink.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfig`] when the configuration fails
    /// validation.
    pub fn new(config: SchedulerConfig, sink: Box<dyn EventSink>) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        let pool = Arc::new(RunwayPool::new(config.runway_count));
        Ok(Self {
            config,
            queue: Arc::new(AdmissionQueue::new()),
            pool,
            sink: Arc::new(Mutex::new(sink)),
            counters: Arc::new(DispatchCounters::default()),
            workers: Mutex::new(Vec::new()),
            worker_states: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Spawn one dispatcher worker per runway.
    ///
    /// Flights submitted before `start` are served once the workers come up.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let mut workers = self.workers.lock();
        let mut states = self.worker_states.lock();
        for runway_id in 1..=self.config.runway_count {
            let state = Arc::new(StateCell::new());
            let ctx = WorkerContext {
                queue: Arc::clone(&self.queue),
                pool: Arc::clone(&self.pool),
                sink: Arc::clone(&self.sink),
                counters: Arc::clone(&self.counters),
                config: self.config.clone(),
            };
            workers.push(spawn_dispatcher(runway_id, ctx, Arc::clone(&state)));
            states.push(state);
        }

        info!(
            runway_count = self.config.runway_count,
            time_compression = self.config.time_compression,
            "scheduler started"
        );
        Ok(())
    }

    /// Enqueue a flight for dispatch.
    ///
    /// Never blocks beyond the queue's critical section.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::QueueClosed`] once shutdown has been initiated.
    pub fn submit(&self, flight: Flight) -> Result<(), SchedulerError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::QueueClosed);
        }
        let id = flight.id;
        self.queue.submit(flight)?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(flight = id, "flight submitted");
        Ok(())
    }

    /// Enqueue a flight into the preempting tier, served before all regular
    /// submissions.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::QueueClosed`] once shutdown has been initiated.
    pub fn submit_preempting(&self, flight: Flight) -> Result<(), SchedulerError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::QueueClosed);
        }
        let id = flight.id;
        self.queue.submit_preempting(flight)?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(flight = id, "flight submitted preempting");
        Ok(())
    }

    /// Initiate shutdown and block until every worker has drained its
    /// remaining work and terminated.
    ///
    /// Idempotent: a second call observes the swapped flag and returns
    /// without re-joining. Submissions racing this call fail fast with
    /// [`SchedulerError::QueueClosed`].
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("shutdown initiated, draining admission queue");
        self.queue.close();

        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock();
            workers.drain(..).collect()
        };
        for handle in handles {
            if handle.join().is_err() {
                warn!("dispatcher panicked during drain");
            }
        }

        info!(
            completed = self.counters.completed.load(Ordering::Relaxed),
            degraded = self.counters.degraded.load(Ordering::Relaxed),
            "shutdown complete"
        );
    }

    /// Lock-free counter snapshot plus current pool occupancy.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            runway_count: self.pool.len(),
            available_runways: self.pool.available(),
            degraded_runways: self.counters.degraded.load(Ordering::Relaxed),
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            queued: self.queue.len(),
        }
    }

    /// Per-worker state snapshot, indexed by runway id minus one.
    #[must_use]
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.worker_states.lock().iter().map(|cell| cell.get()).collect()
    }

    /// The runway ids this scheduler serves.
    #[must_use]
    pub fn runway_ids(&self) -> Vec<RunwayId> {
        (1..=self.config.runway_count).collect()
    }
}

impl Drop for Scheduler {
    /// Signal shutdown but do not join: a dropped scheduler must never hang
    /// its owner. Explicit [`shutdown`](Scheduler::shutdown) is required for
    /// the drain guarantee.
    fn drop(&mut self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.queue.close();
            debug!("scheduler dropped without explicit shutdown");
        }
    }
}
