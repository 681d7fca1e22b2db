//! IO engine abstraction
//!
//! An IO engine performs a single positioned transfer between a worker's
//! buffer and the target. Workers own their engine and never share it, so
//! engines only need to be `Send`.
//!
//! # Engine Types
//!
//! - **Synchronous**: blocking `pread`/`pwrite`, one call per operation
//! - **Mock**: records every operation without touching the target, for tests
//!
//! # Example
//!
//! ```no_run
//! use iotest::config::workload::OperationKind;
//! use iotest::engine::{IoEngine, IoOperation};
//! use iotest::engine::sync::SyncEngine;
//!
//! let file = std::fs::File::open("/tmp/data.bin")?;
//! # use std::os::unix::io::AsRawFd;
//! let mut engine = SyncEngine::new();
//! let mut buffer = vec![0u8; 4096];
//!
//! let transferred = engine.execute(IoOperation {
//!     kind: OperationKind::Read,
//!     fd: file.as_raw_fd(),
//!     offset: 0,
//!     buffer: &mut buffer,
//! })?;
//! println!("read {} bytes", transferred);
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::config::workload::OperationKind;
use std::io;
use std::os::unix::io::RawFd;

/// IO engine trait for all backends
///
/// # Error Handling
///
/// `execute` issues exactly one transfer. A failed call is returned as the
/// OS error; a short transfer (including zero bytes at end of file) is a
/// success carrying the actual byte count. Engines never retry.
pub trait IoEngine: Send {
    /// Perform one positioned read or write
    ///
    /// # Returns
    ///
    /// The number of bytes actually transferred.
    fn execute(&mut self, op: IoOperation<'_>) -> io::Result<usize>;

    /// Short engine name for diagnostics
    fn name(&self) -> &'static str;
}

/// IO operation descriptor
///
/// The transfer length is the buffer length. For O_DIRECT targets the buffer
/// and offset must both be aligned to the device's logical block size.
#[derive(Debug)]
pub struct IoOperation<'a> {
    pub kind: OperationKind,

    /// File descriptor of the target file or device
    pub fd: RawFd,

    /// Byte offset within the target
    pub offset: u64,

    /// Destination for reads, source for writes
    pub buffer: &'a mut [u8],
}

impl IoOperation<'_> {
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

pub mod mock;
pub mod sync;
