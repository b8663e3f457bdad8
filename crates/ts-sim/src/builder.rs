//! Fluent builder for constructing a [`Simulation`].

use std::collections::HashSet;

use log::debug;

use ts_core::{ArbitrationPolicy, IntersectionId, IntersectionRng, SimConfig};
use ts_signal::{ControllerParams, IntersectionController};

use crate::{SimError, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// Every setter overrides the matching [`SimConfig`] field, so a config loaded
/// from a file can be adjusted from the command line before building.
///
/// | Method               | Overrides                        |
/// |----------------------|----------------------------------|
/// | `.intersections(v)`  | `SimConfig::intersection_ids`    |
/// | `.arbitration(p)`    | `SimConfig::arbitration`         |
/// | `.seed(s)`           | `SimConfig::seed`                |
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(SimConfig::default())
///     .intersections(["North", "Centre", "South"])
///     .seed(7)
///     .build()?;
/// sim.start();
/// sim.run_ticks(60, &mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Replace the intersection list.  Slot order follows iteration order.
    pub fn intersections<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<IntersectionId>,
    {
        self.config.intersection_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn arbitration(mut self, policy: ArbitrationPolicy) -> Self {
        self.config.arbitration = policy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validate the configuration and return a stopped [`Simulation`] at
    /// tick 0 with every intersection empty and all-red.
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;

        let mut seen = HashSet::new();
        for id in &self.config.intersection_ids {
            if !seen.insert(id) {
                return Err(SimError::Config(format!("duplicate intersection id {id}")));
            }
        }

        let params = ControllerParams::from_config(&self.config);
        let controllers = self
            .config
            .intersection_ids
            .iter()
            .enumerate()
            .map(|(slot, id)| {
                let rng = IntersectionRng::new(self.config.seed, slot);
                IntersectionController::new(id.clone(), params, rng)
            })
            .collect();

        debug!(
            "built simulation: {} intersection(s), seed {}",
            self.config.intersection_ids.len(),
            self.config.seed
        );
        Ok(Simulation::from_parts(self.config, controllers))
    }
}
