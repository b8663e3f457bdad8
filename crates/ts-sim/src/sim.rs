//! The `Simulation` struct: commands, the tick routine, and snapshots.
//!
//! # Locking
//!
//! `Simulation` is `Sync` and every method takes `&self`, so one instance can
//! be shared between a ticker thread and command callers.  Locks are always
//! taken in this order and never in reverse:
//!
//! ```text
//! run ─▶ clock ─▶ registry ─▶ intersection ─▶ scheduler
//! ```
//!
//! At most one intersection lock is held at a time.  Ticks and incident
//! commands share the `run` lock; `stop` and `reset` take it exclusively, so
//! they wait out any tick or command in flight and nothing mutates after they
//! return.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, TryLockError};

use log::{debug, info, warn};

use ts_core::{Approach, IncidentId, IntersectionId, SimClock, SimConfig, Tick};
use ts_incident::{BlockTarget, Incident, IncidentKind, IncidentRegistry, IncidentRequest};
use ts_signal::{IntersectionController, IntersectionSnapshot, PhaseTimer};

use crate::scheduler::PhaseScheduler;
use crate::sync::{lock, read, write};
use crate::{NoopObserver, SimError, SimObserver, SimResult, SimSnapshot};

#[cfg(feature = "fx-hash")]
type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type IdMap<K, V> = std::collections::HashMap<K, V>;

// ── IntersectionSet ───────────────────────────────────────────────────────────

/// Controllers in slot order, each behind its own lock.
pub(crate) struct IntersectionSet {
    ids:   Vec<IntersectionId>,
    slots: Vec<Mutex<IntersectionController>>,
    index: IdMap<IntersectionId, usize>,
}

impl IntersectionSet {
    pub(crate) fn new(controllers: Vec<IntersectionController>) -> Self {
        let ids: Vec<IntersectionId> = controllers.iter().map(|c| c.id().clone()).collect();
        let index = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
        Self {
            ids,
            slots: controllers.into_iter().map(Mutex::new).collect(),
            index,
        }
    }

    fn slot_of(&self, id: &IntersectionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn lock(&self, slot: usize) -> MutexGuard<'_, IntersectionController> {
        lock(&self.slots[slot])
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

// ── Blocker ───────────────────────────────────────────────────────────────────

/// [`BlockTarget`] over the live intersections: applies a block under the
/// intersection's lock and swaps its queued timer for the re-evaluated one.
struct Blocker<'a> {
    set:       &'a IntersectionSet,
    scheduler: &'a Mutex<PhaseScheduler>,
    now:       Tick,
}

impl BlockTarget for Blocker<'_> {
    fn contains(&self, intersection: &IntersectionId) -> bool {
        self.set.slot_of(intersection).is_some()
    }

    fn set_blocked(&mut self, intersection: &IntersectionId, approach: Approach, blocked: bool) -> bool {
        let Some(slot) = self.set.slot_of(intersection) else {
            return false;
        };
        let mut controller = self.set.lock(slot);
        if let Some(timer) = controller.set_blocked(approach, blocked, self.now) {
            let mut scheduler = lock(self.scheduler);
            scheduler.cancel(slot);
            scheduler.push(slot, timer);
        }
        true
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RunState {
    running: bool,
}

/// The simulation controller.
///
/// Owns the clock, every [`IntersectionController`], the incident registry,
/// and the phase-timer scheduler.  Create via
/// [`SimBuilder`][crate::SimBuilder] or [`Simulation::new`].
///
/// Two drivers advance it: call [`on_tick`][Self::on_tick] /
/// [`run_ticks`][Self::run_ticks] directly, or hand an `Arc<Simulation>` to a
/// [`Ticker`][crate::Ticker] for wall-clock pacing.
pub struct Simulation {
    config:        SimConfig,
    run:           RwLock<RunState>,
    /// Held for the whole of a tick; `try_lock` failing means a tick is
    /// already in flight.
    clock:         Mutex<SimClock>,
    /// Mirror of `clock.current_tick` readable without the clock lock.
    now:           AtomicU64,
    intersections: IntersectionSet,
    incidents:     Mutex<IncidentRegistry>,
    scheduler:     Mutex<PhaseScheduler>,
    latest:        RwLock<SimSnapshot>,
}

impl fmt::Debug for Simulation {
    /// Lock-free summary: never waits on a tick in flight.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.current_tick())
            .field("intersections", &self.intersections.ids)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Validate `config` and build a stopped simulation at tick 0.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        crate::SimBuilder::new(config).build()
    }

    pub(crate) fn from_parts(config: SimConfig, controllers: Vec<IntersectionController>) -> Self {
        let sim = Self {
            config,
            run:           RwLock::new(RunState::default()),
            clock:         Mutex::new(SimClock::new()),
            now:           AtomicU64::new(0),
            intersections: IntersectionSet::new(controllers),
            incidents:     Mutex::new(IncidentRegistry::new()),
            scheduler:     Mutex::new(PhaseScheduler::new()),
            latest:        RwLock::new(SimSnapshot::default()),
        };
        sim.refresh_snapshot(false);
        sim
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn intersection_ids(&self) -> &[IntersectionId] {
        &self.intersections.ids
    }

    pub fn is_running(&self) -> bool {
        read(&self.run).running
    }

    /// The current tick (elapsed simulated seconds).
    pub fn current_tick(&self) -> Tick {
        Tick(self.now.load(Ordering::Acquire))
    }

    /// The snapshot taken after the most recent tick or command.  Never
    /// blocks on a tick in flight and never mutates anything.
    pub fn snapshot(&self) -> SimSnapshot {
        read(&self.latest).clone()
    }

    /// A fresh snapshot of one intersection, taken under its lock.
    pub fn intersection(&self, id: &IntersectionId) -> SimResult<IntersectionSnapshot> {
        let slot = self.slot_of(id)?;
        Ok(self.intersections.lock(slot).snapshot())
    }

    /// Active incidents in creation order.
    pub fn incidents(&self) -> Vec<Incident> {
        lock(&self.incidents).active().cloned().collect()
    }

    /// Number of queued phase timers.  Zero whenever the simulation is
    /// stopped.
    pub fn pending_timer_count(&self) -> usize {
        lock(&self.scheduler).len()
    }

    /// The queued phase timer for one intersection, `None` while stopped.
    pub fn pending_timer(&self, id: &IntersectionId) -> SimResult<Option<PhaseTimer>> {
        let slot = self.slot_of(id)?;
        Ok(lock(&self.scheduler).pending_for(slot))
    }

    /// The earliest tick at which any intersection changes phase.
    pub fn next_phase_change(&self) -> Option<Tick> {
        lock(&self.scheduler).next_tick()
    }

    // ── Lifecycle commands ────────────────────────────────────────────────

    /// Start (or resume) the simulation.  Each intersection takes the next
    /// edge out of its current phase immediately.  No-op if already running.
    pub fn start(&self) {
        let mut run = write(&self.run);
        if run.running {
            debug!("start ignored: already running");
            return;
        }
        run.running = true;

        let now = self.current_tick();
        for slot in 0..self.intersections.len() {
            let mut controller = self.intersections.lock(slot);
            let timer = controller.begin(now);
            lock(&self.scheduler).push(slot, timer);
        }
        info!("simulation started at {now}");
        self.refresh_snapshot(true);
    }

    /// Stop the simulation.  The clock and every phase freeze where they are
    /// and every pending timer is cancelled.  No-op if already stopped.
    pub fn stop(&self) {
        let mut run = write(&self.run);
        if !run.running {
            debug!("stop ignored: not running");
            return;
        }
        run.running = false;
        self.cancel_all_timers();
        info!("simulation stopped at {}", self.current_tick());
        self.refresh_snapshot(false);
    }

    /// Stop, zero the clock, drop every incident, and return every
    /// intersection to empty all-red.
    pub fn reset(&self) {
        let mut run = write(&self.run);
        run.running = false;

        lock(&self.clock).reset();
        self.now.store(0, Ordering::Release);
        let dropped = lock(&self.incidents).forget_all();
        for slot in 0..self.intersections.len() {
            self.intersections.lock(slot).reset();
        }
        lock(&self.scheduler).clear();

        info!("simulation reset ({dropped} incident(s) dropped)");
        self.refresh_snapshot(false);
    }

    fn cancel_all_timers(&self) {
        for slot in 0..self.intersections.len() {
            self.intersections.lock(slot).cancel_timer();
        }
        lock(&self.scheduler).clear();
    }

    // ── Incident commands ─────────────────────────────────────────────────

    /// Raise an incident blocking `approach` at `intersection`.
    ///
    /// Fails with [`SimError::NotRunning`] while stopped and
    /// [`SimError::UnknownIntersection`] for an unknown id; neither changes
    /// any state.
    pub fn trigger_incident(
        &self,
        intersection: &IntersectionId,
        approach:     Approach,
        kind:         IncidentKind,
    ) -> SimResult<IncidentId> {
        let run = read(&self.run);
        if !run.running {
            return Err(SimError::NotRunning);
        }
        let id = {
            let mut registry = lock(&self.incidents);
            let mut blocker = self.blocker();
            let now = blocker.now;
            registry.trigger(&mut blocker, intersection, approach, kind, now)?
        };
        self.refresh_snapshot(run.running);
        Ok(id)
    }

    /// [`trigger_incident`][Self::trigger_incident] for a parsed request.
    pub fn submit(&self, request: &IncidentRequest) -> SimResult<IncidentId> {
        self.trigger_incident(&request.intersection, request.approach, request.kind)
    }

    /// Parse `intersection:approach:kind` and trigger it.  Malformed input is
    /// rejected before any intersection is touched.
    pub fn submit_str(&self, request: &str) -> SimResult<IncidentId> {
        let request: IncidentRequest = request.parse()?;
        self.submit(&request)
    }

    /// Clear one incident.  Allowed while stopped.
    pub fn clear_incident(&self, id: IncidentId) -> SimResult<Incident> {
        let run = read(&self.run);
        let incident = {
            let mut registry = lock(&self.incidents);
            registry.clear(&mut self.blocker(), id)?
        };
        self.refresh_snapshot(run.running);
        Ok(incident)
    }

    /// Clear every incident and unblock their approaches.  Returns how many
    /// were cleared; clearing an empty registry changes nothing.
    pub fn clear_incidents(&self) -> usize {
        let run = read(&self.run);
        let cleared = {
            let mut registry = lock(&self.incidents);
            registry.clear_all(&mut self.blocker())
        };
        if cleared > 0 {
            self.refresh_snapshot(run.running);
        } else {
            debug!("no active incidents to clear");
        }
        cleared
    }

    /// Overwrite one approach's queue (clamped to the cap), e.g. from an
    /// external detector.  Does not re-arm the phase timer.
    pub fn set_queue(&self, intersection: &IntersectionId, approach: Approach, vehicles: u32) -> SimResult<()> {
        let run = read(&self.run);
        let slot = self.slot_of(intersection)?;
        self.intersections.lock(slot).set_queue(approach, vehicles);
        self.refresh_snapshot(run.running);
        Ok(())
    }

    fn blocker(&self) -> Blocker<'_> {
        Blocker {
            set:       &self.intersections,
            scheduler: &self.scheduler,
            now:       self.current_tick(),
        }
    }

    fn slot_of(&self, id: &IntersectionId) -> SimResult<usize> {
        self.intersections
            .slot_of(id)
            .ok_or_else(|| SimError::UnknownIntersection(id.clone()))
    }

    // ── Tick processing ───────────────────────────────────────────────────

    /// Advance one tick with no observer.  See [`tick_with`][Self::tick_with].
    pub fn on_tick(&self) -> Option<SimSnapshot> {
        self.tick_with(&mut NoopObserver)
    }

    /// Advance one tick: clock +1, arrivals at every intersection, fire every
    /// phase timer now due, then aggregate.
    ///
    /// Returns `None` without doing anything if the simulation is stopped or
    /// another tick is still in flight.
    pub fn tick_with<O: SimObserver + ?Sized>(&self, observer: &mut O) -> Option<SimSnapshot> {
        let (now, fired, snapshot) = {
            let run = read(&self.run);
            if !run.running {
                return None;
            }
            let mut clock = match self.clock.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::WouldBlock) => {
                    debug!("tick skipped: previous tick still in flight");
                    return None;
                }
                Err(TryLockError::Poisoned(p)) => {
                    warn!("recovering poisoned clock");
                    p.into_inner()
                }
            };

            let now = clock.advance();
            self.now.store(now.0, Ordering::Release);
            observer.on_tick_start(now);

            self.generate_arrivals();
            let fired = self.fire_due(now);

            let snapshot = self.collect_snapshot(true);
            *write(&self.latest) = snapshot.clone();
            (now, fired, snapshot)
        };

        observer.on_tick_end(now, fired);
        observer.on_snapshot(&snapshot);
        Some(snapshot)
    }

    /// Run `n` ticks back to back.  Returns the number actually processed,
    /// which is smaller than `n` only if the simulation is stopped meanwhile.
    pub fn run_ticks<O: SimObserver + ?Sized>(&self, n: u64, observer: &mut O) -> SimResult<u64> {
        if !self.is_running() {
            return Err(SimError::NotRunning);
        }
        let mut done = 0;
        for _ in 0..n {
            if self.tick_with(observer).is_none() {
                break;
            }
            done += 1;
        }
        observer.on_sim_end(self.current_tick());
        Ok(done)
    }

    #[cfg(not(feature = "parallel"))]
    fn generate_arrivals(&self) {
        for slot in 0..self.intersections.len() {
            self.intersections.lock(slot).generate_arrivals();
        }
    }

    #[cfg(feature = "parallel")]
    fn generate_arrivals(&self) {
        use rayon::prelude::*;

        (0..self.intersections.len()).into_par_iter().for_each(|slot| {
            self.intersections.lock(slot).generate_arrivals();
        });
    }

    /// Fire every timer due at `now`.  Returns how many produced a transition.
    fn fire_due(&self, now: Tick) -> usize {
        let due = lock(&self.scheduler).drain_due(now);
        let mut fired = 0;
        for entry in due {
            let mut controller = self.intersections.lock(entry.slot);
            if let Some(next) = controller.fire(&entry.timer, now) {
                lock(&self.scheduler).push(entry.slot, next);
                fired += 1;
            }
        }
        fired
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    fn collect_snapshot(&self, running: bool) -> SimSnapshot {
        let active = lock(&self.incidents).len();
        let intersections = (0..self.intersections.len())
            .map(|slot| self.intersections.lock(slot).snapshot())
            .collect();
        SimSnapshot::aggregate(self.current_tick().0, running, intersections, active)
    }

    fn refresh_snapshot(&self, running: bool) {
        let snapshot = self.collect_snapshot(running);
        *write(&self.latest) = snapshot;
    }
}
