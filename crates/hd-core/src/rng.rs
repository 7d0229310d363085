//! Seeded random streams.
//!
//! Two kinds of stream exist and neither is ever shared between threads:
//!
//! | Type       | Owner                         | Seed                               |
//! |------------|-------------------------------|------------------------------------|
//! | `AgentRng` | the trainer's worker for a hub | `seed XOR ((hub + 1) · φ64)`      |
//! | `SimRng`   | one simulation run            | `seed`                             |
//!
//! φ64 is the 64-bit fractional part of the golden ratio; multiplying by it
//! scatters neighbouring hub ids across the seed space, so hub streams are
//! unrelated to each other and to the simulation stream of the same seed.
//! Training output therefore depends only on the seed, never on which
//! thread trained which hub.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::NodeId;

const PHI64: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw helpers shared by both stream types.
macro_rules! draws {
    ($name:ident) => {
        impl $name {
            /// Uniform sample of any `Standard`-distributed type; `f64` is in `[0, 1)`.
            #[inline]
            pub fn random<T>(&mut self) -> T
            where
                rand::distributions::Standard: rand::distributions::Distribution<T>,
            {
                self.0.r#gen()
            }

            #[inline]
            pub fn gen_range<T, R>(&mut self, range: R) -> T
            where
                T: rand::distributions::uniform::SampleUniform,
                R: rand::distributions::uniform::SampleRange<T>,
            {
                self.0.gen_range(range)
            }

            /// `None` for an empty slice.
            #[inline]
            pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
                use rand::seq::SliceRandom;
                slice.choose(&mut self.0)
            }
        }
    };
}

/// Exploration and demand stream of one hub's trainer.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(seed: u64, hub: NodeId) -> Self {
        let mixed = seed ^ (hub.0 as u64 + 1).wrapping_mul(PHI64);
        AgentRng(SmallRng::seed_from_u64(mixed))
    }
}

/// Order-generation stream of one simulation run.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Exponentially distributed gap with the given mean (inverse CDF).
    pub fn exp_gap(&mut self, mean: f64) -> f64 {
        let u: f64 = self.0.r#gen();
        -(1.0 - u).ln() * mean
    }
}

draws!(AgentRng);
draws!(SimRng);
