//! Fixed-size runway pool with atomic acquisition and notify-on-release.

use parking_lot::{Condvar, Mutex};
use tracing::warn;

use crate::core::SchedulerError;

/// Stable runway identifier, `1..=N` for a pool of N slots.
pub type RunwayId = u32;

/// State of one slot. `Retired` slots never return to service; they mark a
/// degraded pool after a fatal ordering violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Occupied,
    Retired,
}

/// Fixed set of exclusively-held runway slots behind one pool lock.
///
/// Acquisition is atomic with respect to other acquisitions: no two callers
/// can claim the same slot from a single free-check. Every release notifies
/// workers blocked in [`wait_for_any`](RunwayPool::wait_for_any).
pub struct RunwayPool {
    slots: Mutex<Vec<SlotState>>,
    freed: Condvar,
}

impl RunwayPool {
    /// Create a pool with `count` free slots, ids `1..=count`.
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            slots: Mutex::new(vec![SlotState::Free; count as usize]),
            freed: Condvar::new(),
        }
    }

    fn index(slots: &[SlotState], id: RunwayId) -> Result<usize, SchedulerError> {
        let idx = id.checked_sub(1).ok_or(SchedulerError::UnknownRunway(id))? as usize;
        if idx >= slots.len() {
            return Err(SchedulerError::UnknownRunway(id));
        }
        Ok(idx)
    }

    /// Attempt to claim a specific slot without blocking.
    ///
    /// Returns `false` when the slot is occupied or retired.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::UnknownRunway`] for an id outside the pool.
    pub fn try_acquire(&self, id: RunwayId) -> Result<bool, SchedulerError> {
        let mut slots = self.slots.lock();
        let idx = Self::index(&slots, id)?;
        if slots[idx] == SlotState::Free {
            slots[idx] = SlotState::Occupied;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Scan for any free slot and claim it, lowest id first.
    #[must_use]
    pub fn try_acquire_any(&self) -> Option<RunwayId> {
        let mut slots = self.slots.lock();
        let idx = slots.iter().position(|slot| *slot == SlotState::Free)?;
        slots[idx] = SlotState::Occupied;
        Some(idx as RunwayId + 1)
    }

    /// Mark a slot free and wake one worker blocked on pool availability.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::DuplicateRelease`] when the slot was not occupied.
    /// Callers treat this as reported-but-non-fatal.
    /// [`SchedulerError::UnknownRunway`] for an id outside the pool.
    pub fn release(&self, id: RunwayId) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock();
        let idx = Self::index(&slots, id)?;
        if slots[idx] != SlotState::Occupied {
            return Err(SchedulerError::DuplicateRelease(id));
        }
        slots[idx] = SlotState::Free;
        drop(slots);
        self.freed.notify_one();
        Ok(())
    }

    /// Permanently remove a slot from service after a fatal invariant
    /// violation. The pool continues with one fewer effective runway.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::UnknownRunway`] for an id outside the pool.
    pub fn retire(&self, id: RunwayId) -> Result<(), SchedulerError> {
        let mut slots = self.slots.lock();
        let idx = Self::index(&slots, id)?;
        slots[idx] = SlotState::Retired;
        warn!(runway = id, "runway retired, pool degraded");
        drop(slots);
        // Waiters must re-evaluate: this slot will never free.
        self.freed.notify_all();
        Ok(())
    }

    /// Block until at least one slot is free.
    ///
    /// Returns `false` when every slot has been retired and no acquisition
    /// can ever succeed again; `true` otherwise. Used by pool-wide dispatch
    /// loops to avoid busy-polling.
    pub fn wait_for_any(&self) -> bool {
        let mut slots = self.slots.lock();
        loop {
            if slots.iter().any(|slot| *slot == SlotState::Free) {
                return true;
            }
            if slots.iter().all(|slot| *slot == SlotState::Retired) {
                return false;
            }
            self.freed.wait(&mut slots);
        }
    }

    /// Total slot count, including retired slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the pool was created with zero slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Number of currently free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|slot| **slot == SlotState::Free)
            .count()
    }

    /// Number of retired slots.
    #[must_use]
    pub fn retired(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|slot| **slot == SlotState::Retired)
            .count()
    }
}
