//! Seedable random source.
//!
//! Every stochastic step in the model (training-feature sampling, dropout
//! masks, weight initialisation, scenario hub/motorway designation, traffic
//! draws) takes a `&mut SimRng` argument instead of reaching for a global
//! generator.  Seeding one `SimRng` therefore pins an entire run, and tests
//! get reproducible graphs without process-wide seeding side effects.
//!
//! Scenario results are *not* reproducible across calls that share an
//! unseeded (`from_entropy`) generator; each simulation step re-samples its
//! stochastic inputs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG.
///
/// Not `Sync`-shared: each request or training run owns its own instance.
pub struct SimRng(SmallRng);

impl SimRng {
    /// Deterministic generator for reproducible runs and tests.
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
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

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice; `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
