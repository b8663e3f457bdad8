//! Simulation configuration.

use std::time::Duration;

use crate::{CoreError, CoreResult, IntersectionId};

// ── ArbitrationPolicy ─────────────────────────────────────────────────────────

/// How an all-red intersection picks a direction when *both* directions have
/// demand.  Single-direction demand always goes to that direction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArbitrationPolicy {
    /// EW keeps the green if it was served last; otherwise NS goes first.
    #[default]
    PreferLast,
    /// Serve the direction opposite to the one served last; NS when nothing
    /// has been served since the last reset.
    Alternate,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Every field has a default, so a TOML file (with the `serde` feature) only
/// needs to name what it overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Seconds a green phase holds before turning yellow.
    pub base_green_secs: u64,

    /// Seconds a yellow phase holds before all-red.
    pub yellow_secs: u64,

    /// Seconds of all-red clearance.  An idle intersection (no demand in
    /// either direction) holds all-red for twice this long.
    pub all_red_pause_secs: u64,

    /// Queue length cap per approach.
    pub max_vehicles_per_approach: u32,

    /// An unblocked approach with at least this many queued vehicles makes
    /// its intersection congested.
    pub congestion_threshold: u32,

    /// Wall-clock time between ticks when driven by the real-time ticker.
    /// One tick is always one simulated second.
    pub tick_period_ms: u64,

    /// Vehicles discharged from each unblocked approach on entering green.
    pub vehicles_processed_per_green: u32,

    /// Per-tick probability that one vehicle arrives on an unblocked approach.
    pub arrival_probability: f64,

    /// Tie-break used when both directions have demand.
    pub arbitration: ArbitrationPolicy,

    /// Intersections to create, in slot order.
    pub intersection_ids: Vec<IntersectionId>,

    /// Master RNG seed for the arrival process.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_green_secs:              8,
            yellow_secs:                  2,
            all_red_pause_secs:           1,
            max_vehicles_per_approach:    50,
            congestion_threshold:         25,
            tick_period_ms:               1_000,
            vehicles_processed_per_green: 3,
            arrival_probability:          0.25,
            arbitration:                  ArbitrationPolicy::PreferLast,
            intersection_ids:             vec!["A".into(), "B".into(), "C".into()],
            seed:                         0,
        }
    }
}

impl SimConfig {
    /// Wall-clock period between real-time ticks.
    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Reject configurations the signal controller cannot run.
    ///
    /// Duplicate intersection ids are checked by the simulation builder,
    /// which owns the id table.
    pub fn validate(&self) -> CoreResult<()> {
        if self.base_green_secs == 0 || self.yellow_secs == 0 || self.all_red_pause_secs == 0 {
            return Err(CoreError::Config(
                "phase durations must be at least one second".into(),
            ));
        }
        if self.max_vehicles_per_approach == 0 {
            return Err(CoreError::Config("max_vehicles_per_approach must be positive".into()));
        }
        if self.congestion_threshold > self.max_vehicles_per_approach {
            return Err(CoreError::Config(format!(
                "congestion_threshold {} exceeds max_vehicles_per_approach {}",
                self.congestion_threshold, self.max_vehicles_per_approach
            )));
        }
        if !(0.0..=1.0).contains(&self.arrival_probability) {
            return Err(CoreError::Config(format!(
                "arrival_probability {} is outside [0, 1]",
                self.arrival_probability
            )));
        }
        if self.tick_period_ms == 0 {
            return Err(CoreError::Config("tick_period_ms must be positive".into()));
        }
        if self.intersection_ids.is_empty() {
            return Err(CoreError::Config("at least one intersection is required".into()));
        }
        Ok(())
    }
}
