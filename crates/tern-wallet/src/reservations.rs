//! In-memory reservation table for outputs committed to in-flight
//! transactions.
//!
//! Reservations are deliberately not persisted: after a restart nothing is
//! reserved, which matches the fact that unsigned in-flight transactions do
//! not survive a restart either. Expiry is lazy; an entry past its deadline
//! simply reads as unlocked and is pruned on the next lookup.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use tern_core::types::OutputId;

#[derive(Default)]
pub(crate) struct ReservationTable {
    inner: Mutex<HashMap<OutputId, Instant>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the table for a check-and-reserve sequence. All lookups
    /// through the returned guard share a single timestamp, so an output
    /// cannot flip from locked to unlocked mid-operation.
    pub fn lock(&self) -> ReservationGuard<'_> {
        ReservationGuard {
            map: self.inner.lock(),
            now: Instant::now(),
        }
    }
}

pub(crate) struct ReservationGuard<'a> {
    map: MutexGuard<'a, HashMap<OutputId, Instant>>,
    now: Instant,
}

impl ReservationGuard<'_> {
    /// Whether `id` holds an unexpired reservation. Expired entries are
    /// removed as a side effect.
    pub fn is_locked(&mut self, id: OutputId) -> bool {
        match self.map.get(&id) {
            Some(&expiry) if expiry > self.now => true,
            Some(_) => {
                self.map.remove(&id);
                false
            }
            None => false,
        }
    }

    /// Reserve `id` for `duration` from the guard's timestamp, replacing
    /// any prior reservation.
    pub fn reserve(&mut self, id: OutputId, duration: Duration) {
        self.map.insert(id, self.now + duration);
    }

    /// Drop any reservation on `id`. Releasing an unreserved output is a
    /// no-op.
    pub fn release(&mut self, id: OutputId) {
        self.map.remove(&id);
    }
}
