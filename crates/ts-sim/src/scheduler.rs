//! `PhaseScheduler`: pending phase timers ordered by due tick.
//!
//! Each intersection owns at most one live [`PhaseTimer`]; the scheduler
//! holds a copy keyed by its due tick so each simulation tick drains only the
//! timers that expire on it.  Cancelling is removal-by-slot.  A copy that
//! escapes cancellation (drained just before an incident re-armed the
//! intersection) is caught by the controller's epoch check instead.
//!
//! `BTreeMap` gives O(log D) insert and O(log D) drain where D = number of
//! distinct due ticks, which is bounded by the longest phase hold.

use std::collections::BTreeMap;

use ts_core::Tick;
use ts_signal::PhaseTimer;

/// A timer queued for the intersection at `slot`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ScheduledPhase {
    pub slot:  usize,
    pub timer: PhaseTimer,
}

/// A priority queue mapping due ticks → phase timers that expire then.
#[derive(Default, Debug)]
pub struct PhaseScheduler {
    inner: BTreeMap<Tick, Vec<ScheduledPhase>>,
    /// Cached entry count for O(1) `len()`.
    total: usize,
}

impl PhaseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `timer` for the intersection at `slot`.
    pub fn push(&mut self, slot: usize, timer: PhaseTimer) {
        self.inner
            .entry(timer.due)
            .or_default()
            .push(ScheduledPhase { slot, timer });
        self.total += 1;
    }

    /// Remove and return every entry due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: Tick) -> Vec<ScheduledPhase> {
        let later = self.inner.split_off(&now.offset(1));
        let due = std::mem::replace(&mut self.inner, later);
        let entries: Vec<ScheduledPhase> = due.into_values().flatten().collect();
        self.total -= entries.len();
        entries
    }

    /// Drop every entry for `slot`.  Returns how many were removed.
    pub fn cancel(&mut self, slot: usize) -> usize {
        let before = self.total;
        let mut remaining = 0;
        self.inner.retain(|_, entries| {
            entries.retain(|e| e.slot != slot);
            remaining += entries.len();
            !entries.is_empty()
        });
        self.total = remaining;
        before - remaining
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }

    /// The earliest due tick, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// The queued timer for `slot`, if any.
    pub fn pending_for(&self, slot: usize) -> Option<PhaseTimer> {
        self.inner
            .values()
            .flatten()
            .find(|e| e.slot == slot)
            .map(|e| e.timer)
    }

    /// Total number of queued timers.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
