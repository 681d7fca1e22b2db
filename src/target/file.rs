//! Regular file geometry
//!
//! A regular file's extent is its length; its native block size is the
//! filesystem's preferred IO size (`st_blksize`) and its block count is the
//! number of 512-byte units allocated to it (`st_blocks`).

use super::Geometry;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

/// Read size information for a regular file from its metadata
pub fn probe(metadata: &Metadata) -> Geometry {
    Geometry {
        size: metadata.len(),
        block_size: metadata.blksize(),
        block_count: metadata.blocks(),
    }
}
