//! Block index generation
//!
//! Workers address the target in whole blocks. A distribution hands out
//! block indexes in `[0, num_blocks)`; the worker turns them into byte
//! offsets with `offset = block * block_size`, which keeps every offset
//! aligned to the block size as O_DIRECT requires.
//!
//! # Distributions
//!
//! - **Sequential**: 0, 1, 2, ... wrapping at the end of the target
//! - **Uniform**: independent uniform draw for every operation
//!
//! # Example
//!
//! ```
//! use iotest::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::new();
//! let block_num = dist.next_block(1024);
//! assert!(block_num < 1024);
//!
//! let offset = block_num * 4096;
//! assert_eq!(offset % 4096, 0);
//! ```

use crate::config::workload::AccessPattern;

/// Distribution trait for block number generation
///
/// Distributions must be `Send`; each worker owns its own instance.
pub trait Distribution: Send {
    /// Generate next block number within range
    ///
    /// # Arguments
    ///
    /// * `num_blocks` - Number of whole blocks in the target
    ///
    /// # Returns
    ///
    /// A block number in the range [0, num_blocks), or 0 when `num_blocks` is 0.
    fn next_block(&mut self, num_blocks: u64) -> u64;
}

/// Build a fresh generator for an access pattern
///
/// Random generators are seeded from entropy, so every worker draws an
/// independent sequence.
pub fn for_pattern(pattern: AccessPattern) -> Box<dyn Distribution> {
    match pattern {
        AccessPattern::Sequential => Box::new(sequential::SequentialDistribution::new()),
        AccessPattern::Random => Box::new(uniform::UniformDistribution::new()),
    }
}

pub mod sequential;
pub mod uniform;
