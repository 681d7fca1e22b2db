//! Uniform random distribution
//!
//! Every block has equal probability and each draw is independent of the
//! previous one.
//!
//! # Performance
//!
//! Uses the xoshiro256++ PRNG, which is fast enough to sit on the per-IO path.
//!
//! # Example
//!
//! ```
//! use iotest::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7);
//! for _ in 0..10 {
//!     assert!(dist.next_block(1024) < 1024);
//! }
//! ```

use super::Distribution;
use rand::distributions::{Distribution as _, Uniform};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform random distribution
///
/// The sampler for the last seen range is cached, since the range stays the
/// same for a whole run.
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
    sampler: Option<(u64, Uniform<u64>)>,
}

impl UniformDistribution {
    /// Seeded from OS entropy, independent of every other instance
    pub fn new() -> Self {
        Self::from_rng(Xoshiro256PlusPlus::from_entropy())
    }

    /// Reproducible sequence for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn from_rng(rng: Xoshiro256PlusPlus) -> Self {
        Self { rng, sampler: None }
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution for UniformDistribution {
    #[inline]
    fn next_block(&mut self, num_blocks: u64) -> u64 {
        if num_blocks == 0 {
            return 0;
        }

        if !matches!(self.sampler, Some((range, _)) if range == num_blocks) {
            self.sampler = Some((num_blocks, Uniform::new(0, num_blocks)));
        }

        match &self.sampler {
            Some((_, sampler)) => sampler.sample(&mut self.rng),
            None => 0,
        }
    }
}
