//! `IntersectionController`: queues, blocking, congestion, and the phase
//! state machine for one intersection.
//!
//! # Timer ownership
//!
//! The controller owns at most one pending [`PhaseTimer`].  Every time it
//! arms a timer it bumps its `epoch`; the scheduler hands the timer back on
//! expiry and [`IntersectionController::fire`] ignores any timer whose epoch
//! is not the current one.  Cancelling is therefore O(1) and a timer that was
//! already in flight when its intersection was stopped, reset, or re-armed
//! by an incident can never mutate state.

use log::{debug, trace};

use ts_core::{
    Approach, ArbitrationPolicy, Direction, IntersectionId, IntersectionRng, PerApproach,
    SimConfig, Tick,
};

use crate::phase::{self, Demand, LightState, Phase, PhaseTiming, Transition};
use crate::{IntersectionSnapshot, IntersectionStatus};

// ── Parameters ────────────────────────────────────────────────────────────────

/// The per-intersection slice of [`SimConfig`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ControllerParams {
    pub timing:                       PhaseTiming,
    pub max_vehicles_per_approach:    u32,
    pub congestion_threshold:         u32,
    pub vehicles_processed_per_green: u32,
    pub arrival_probability:          f64,
    pub arbitration:                  ArbitrationPolicy,
}

impl ControllerParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            timing:                       PhaseTiming::from_config(config),
            max_vehicles_per_approach:    config.max_vehicles_per_approach,
            congestion_threshold:         config.congestion_threshold,
            vehicles_processed_per_green: config.vehicles_processed_per_green,
            arrival_probability:          config.arrival_probability,
            arbitration:                  config.arbitration,
        }
    }
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

// ── PhaseTimer ────────────────────────────────────────────────────────────────

/// A scheduled phase expiry.  `phase` is the phase that was entered when the
/// timer was armed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PhaseTimer {
    pub epoch:    u64,
    pub phase:    Phase,
    pub armed_at: Tick,
    pub due:      Tick,
}

// ── IntersectionController ────────────────────────────────────────────────────

/// Signal state machine and queue model for a single intersection.
#[derive(Debug)]
pub struct IntersectionController {
    id:             IntersectionId,
    params:         ControllerParams,
    vehicle_counts: PerApproach<u32>,
    blocked:        PerApproach<bool>,
    phase:          Phase,
    /// Direction of the most recent green, used by the all-red tie-break.
    last_served:    Option<Direction>,
    congested:      bool,
    pending:        Option<PhaseTimer>,
    epoch:          u64,
    rng:            IntersectionRng,
}

impl IntersectionController {
    /// A fresh controller: empty queues, nothing blocked, `AllRed`, unarmed.
    pub fn new(id: IntersectionId, params: ControllerParams, rng: IntersectionRng) -> Self {
        Self {
            id,
            params,
            vehicle_counts: PerApproach::splat(0),
            blocked:        PerApproach::splat(false),
            phase:          Phase::AllRed,
            last_served:    None,
            congested:      false,
            pending:        None,
            epoch:          0,
            rng,
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn id(&self) -> &IntersectionId {
        &self.id
    }

    pub fn params(&self) -> &ControllerParams {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Always derived from the phase, so it can never disagree with it.
    pub fn light_state(&self) -> LightState {
        self.phase.light_state()
    }

    pub fn vehicle_counts(&self) -> &PerApproach<u32> {
        &self.vehicle_counts
    }

    pub fn queue(&self, approach: Approach) -> u32 {
        self.vehicle_counts[approach]
    }

    pub fn blocked(&self) -> &PerApproach<bool> {
        &self.blocked
    }

    pub fn is_blocked(&self, approach: Approach) -> bool {
        self.blocked[approach]
    }

    pub fn is_congested(&self) -> bool {
        self.congested
    }

    pub fn last_served(&self) -> Option<Direction> {
        self.last_served
    }

    pub fn pending_timer(&self) -> Option<PhaseTimer> {
        self.pending
    }

    /// `true` while a phase timer is armed, i.e. while the simulation runs.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Directions with at least one unblocked, non-empty approach.
    pub fn demand(&self) -> Demand {
        let has = |d: Direction| {
            d.approaches()
                .into_iter()
                .any(|a| self.vehicle_counts[a] > 0 && !self.blocked[a])
        };
        Demand {
            ns: has(Direction::NorthSouth),
            ew: has(Direction::EastWest),
        }
    }

    pub fn status(&self) -> IntersectionStatus {
        if self.blocked.values().any(|&b| b) {
            IntersectionStatus::Incident
        } else if self.congested {
            IntersectionStatus::Congested
        } else {
            IntersectionStatus::Normal
        }
    }

    pub fn snapshot(&self) -> IntersectionSnapshot {
        IntersectionSnapshot {
            id:             self.id.clone(),
            vehicle_counts: self.vehicle_counts,
            phase:          self.phase,
            light_state:    self.light_state(),
            blocked:        self.blocked,
            congested:      self.congested,
            status:         self.status(),
        }
    }

    // ── Queues and congestion ─────────────────────────────────────────────

    /// One arrival draw per unblocked approach; returns how many vehicles
    /// joined a queue.  Full queues stay at the cap.
    pub fn generate_arrivals(&mut self) -> u32 {
        let mut arrived = 0;
        for approach in Approach::ALL {
            if self.blocked[approach] {
                continue;
            }
            if self.rng.gen_bool(self.params.arrival_probability) {
                let q = &mut self.vehicle_counts[approach];
                if *q < self.params.max_vehicles_per_approach {
                    *q += 1;
                    arrived += 1;
                }
            }
        }
        self.evaluate_congestion();
        arrived
    }

    /// Recompute and return `congested`.
    pub fn evaluate_congestion(&mut self) -> bool {
        let threshold = self.params.congestion_threshold;
        self.congested = self
            .vehicle_counts
            .iter()
            .any(|(a, &q)| q >= threshold && !self.blocked[a]);
        self.congested
    }

    /// Overwrite one queue (clamped to the cap), e.g. from a detector reading.
    pub fn set_queue(&mut self, approach: Approach, vehicles: u32) {
        self.vehicle_counts[approach] = vehicles.min(self.params.max_vehicles_per_approach);
        self.evaluate_congestion();
    }

    // ── Blocking ──────────────────────────────────────────────────────────

    /// Set or clear the incident block on `approach`.
    ///
    /// Congestion is recomputed immediately.  If a phase timer is armed it is
    /// cancelled and the phase re-evaluated at `now`; the replacement timer is
    /// returned for the caller to schedule.  Setting a flag to the value it
    /// already has changes nothing.
    pub fn set_blocked(&mut self, approach: Approach, blocked: bool, now: Tick) -> Option<PhaseTimer> {
        if self.blocked[approach] == blocked {
            return None;
        }
        self.blocked[approach] = blocked;
        self.evaluate_congestion();
        debug!(
            "{}: approach {approach} {}",
            self.id,
            if blocked { "blocked" } else { "unblocked" }
        );

        if self.cancel_timer().is_none() {
            return None;
        }
        let t = phase::reevaluate_transition(
            self.phase,
            self.demand(),
            self.last_served,
            self.params.arbitration,
            self.params.timing,
        );
        Some(self.enter(t, now))
    }

    // ── Phase timers ──────────────────────────────────────────────────────

    /// Take the first edge out of the current phase at `now` and arm a timer.
    ///
    /// Called when the simulation starts (or resumes after a stop).
    pub fn begin(&mut self, now: Tick) -> PhaseTimer {
        self.cancel_timer();
        self.advance(now)
    }

    /// Handle an expired timer.  Returns the next timer to schedule, or
    /// `None` if `timer` is stale (cancelled or superseded).
    pub fn fire(&mut self, timer: &PhaseTimer, now: Tick) -> Option<PhaseTimer> {
        match self.pending {
            Some(p) if p.epoch == timer.epoch => {
                self.pending = None;
                Some(self.advance(now))
            }
            _ => {
                trace!("{}: discarding stale timer {timer:?}", self.id);
                None
            }
        }
    }

    /// Disarm the pending timer, if any.  Any copy still held by a scheduler
    /// becomes stale.
    pub fn cancel_timer(&mut self) -> Option<PhaseTimer> {
        self.epoch += 1;
        self.pending.take()
    }

    /// Empty queues, clear blocks, cancel the timer, and force `AllRed`.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.vehicle_counts = PerApproach::splat(0);
        self.blocked = PerApproach::splat(false);
        self.congested = false;
        self.last_served = None;
        self.phase = Phase::AllRed;
    }

    fn advance(&mut self, now: Tick) -> PhaseTimer {
        let t = phase::next_transition(
            self.phase,
            self.demand(),
            self.last_served,
            self.params.arbitration,
            self.params.timing,
        );
        self.enter(t, now)
    }

    /// Apply a transition and arm its timer.  Entering a green from any other
    /// phase discharges the served approaches.
    fn enter(&mut self, t: Transition, now: Tick) -> PhaseTimer {
        if t.phase != self.phase {
            debug!("{}: {} -> {} for {}s at {now}", self.id, self.phase, t.phase, t.hold_secs);
            if let (true, Some(direction)) = (t.phase.is_green(), t.phase.direction()) {
                self.discharge(direction);
                self.last_served = Some(direction);
            }
            self.phase = t.phase;
        }

        self.epoch += 1;
        let timer = PhaseTimer {
            epoch:    self.epoch,
            phase:    self.phase,
            armed_at: now,
            due:      now + t.hold_secs,
        };
        self.pending = Some(timer);
        timer
    }

    fn discharge(&mut self, direction: Direction) {
        let n = self.params.vehicles_processed_per_green;
        for approach in direction.approaches() {
            if !self.blocked[approach] {
                let q = &mut self.vehicle_counts[approach];
                *q = q.saturating_sub(n);
            }
        }
        self.evaluate_congestion();
    }
}
