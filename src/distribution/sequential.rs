//! Sequential block generation
//!
//! Each worker keeps its own cursor starting at block 0. Workers are not
//! partitioned, so several sequential workers sweep the same blocks.

use crate::distribution::Distribution;

/// Sequential block generator
///
/// Generates block numbers 0, 1, 2, ... and wraps to 0 when the cursor
/// reaches `num_blocks`.
#[derive(Debug, Default)]
pub struct SequentialDistribution {
    current_block: u64,
}

impl SequentialDistribution {
    pub fn new() -> Self {
        Self { current_block: 0 }
    }
}

impl Distribution for SequentialDistribution {
    fn next_block(&mut self, num_blocks: u64) -> u64 {
        if num_blocks == 0 {
            return 0;
        }

        // Range may shrink between calls; never hand out a stale index
        if self.current_block >= num_blocks {
            self.current_block = 0;
        }

        let block = self.current_block;
        self.current_block += 1;
        if self.current_block >= num_blocks {
            self.current_block = 0;
        }

        block
    }
}
