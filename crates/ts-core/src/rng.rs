//! Per-intersection RNG wrapper for the vehicle arrival process.
//!
//! # Seeding strategy
//!
//! Each intersection gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (slot * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive slots uniformly across the seed space.  Arrival
//! draws therefore happen under the owning intersection's lock with no
//! shared RNG state, and the draws for one intersection do not depend on how
//! many others exist or in which order ticks visit them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-intersection RNG.
#[derive(Clone, Debug)]
pub struct IntersectionRng(SmallRng);

impl IntersectionRng {
    /// Seed from the run's global seed and the intersection's slot index.
    pub fn new(global_seed: u64, slot: usize) -> Self {
        let seed = global_seed ^ (slot as u64).wrapping_mul(MIXING_CONSTANT);
        IntersectionRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
