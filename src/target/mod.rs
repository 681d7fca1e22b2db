//! Target resolution
//!
//! A target is the regular file or block device the benchmark drives. It is
//! opened once at startup, classified, and measured; the resulting
//! [`TargetDescriptor`] is then shared read-only by every worker for the rest
//! of the run. The handle is closed when the last reference is dropped.
//!
//! # Example
//!
//! ```no_run
//! use iotest::target::{OpenFlags, TargetDescriptor, TargetKind};
//!
//! let flags = OpenFlags { write: false, sync: false, direct: true };
//! let target = TargetDescriptor::open("/dev/sdb", flags)?;
//!
//! assert_eq!(target.kind(), TargetKind::BlockDevice);
//! println!("{} blocks of {} bytes", target.block_count(), target.native_block_size());
//! # Ok::<(), iotest::error::BenchError>(())
//! ```

pub mod block;
pub mod file;

use crate::config::workload::OperationKind;
use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::Result;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Open flags for targets
///
/// Reads open the target read-only, writes open it read-write. The target is
/// never created or truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// Open read-write instead of read-only
    pub write: bool,

    /// Use synchronous IO (O_SYNC)
    pub sync: bool,

    /// Use direct IO (O_DIRECT) - bypass page cache
    pub direct: bool,
}

impl OpenFlags {
    /// Derive open flags from the operation kind and durability mode
    pub fn for_config(config: &BenchConfig) -> Self {
        Self {
            write: config.operation == OperationKind::Write,
            sync: config.durability.is_sync(),
            direct: config.durability.is_direct(),
        }
    }

    fn custom_flags(&self) -> i32 {
        let mut flags = 0;
        if self.direct {
            flags |= libc::O_DIRECT;
        }
        if self.sync {
            flags |= libc::O_SYNC;
        }
        flags
    }
}

/// Kind of target, decided from the file type at open time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    RegularFile,
    BlockDevice,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::RegularFile => write!(f, "regular file"),
            TargetKind::BlockDevice => write!(f, "block device"),
        }
    }
}

/// Size information gathered from the target after it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Addressable size in bytes
    pub size: u64,
    /// Native block size (st_blksize for files, sector size for devices)
    pub block_size: u64,
    /// Native block count (st_blocks for files, size / sector size for devices)
    pub block_count: u64,
}

/// An opened, classified and measured target
#[derive(Debug)]
pub struct TargetDescriptor {
    path: PathBuf,
    file: File,
    kind: TargetKind,
    geometry: Geometry,
}

impl TargetDescriptor {
    /// Open `path` and query its kind and extent
    ///
    /// # Errors
    ///
    /// - `TargetOpen` if the open call fails
    /// - `TargetStat` if the file metadata cannot be read
    /// - `DeviceQuery` if a block device size or sector-size query fails
    /// - `UnsupportedTarget` for anything but a regular file or block device
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        options.read(true).write(flags.write);
        let custom = flags.custom_flags();
        if custom != 0 {
            options.custom_flags(custom);
        }

        let file = options.open(&path).map_err(|source| BenchError::TargetOpen {
            path: path.clone(),
            source,
        })?;

        let metadata = file.metadata().map_err(|source| BenchError::TargetStat {
            path: path.clone(),
            source,
        })?;

        let file_type = metadata.file_type();
        let (kind, geometry) = if file_type.is_file() {
            (TargetKind::RegularFile, file::probe(&metadata))
        } else if file_type.is_block_device() {
            (TargetKind::BlockDevice, block::probe(&file, &path)?)
        } else {
            return Err(BenchError::UnsupportedTarget { path });
        };

        debug!(
            path = %path.display(),
            %kind,
            size = geometry.size,
            native_block_size = geometry.block_size,
            block_count = geometry.block_count,
            "target resolved"
        );

        Ok(Self {
            path,
            file,
            kind,
            geometry,
        })
    }

    /// Open the target described by a configuration
    pub fn for_config(config: &BenchConfig) -> Result<Self> {
        Self::open(&config.target, OpenFlags::for_config(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Total addressable size in bytes
    pub fn size(&self) -> u64 {
        self.geometry.size
    }

    pub fn native_block_size(&self) -> u64 {
        self.geometry.block_size
    }

    pub fn block_count(&self) -> u64 {
        self.geometry.block_count
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Raw descriptor for positioned IO
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Number of whole `block_size` blocks in the target
    ///
    /// This is the domain of block indexes workers may address.
    pub fn range(&self, block_size: u64) -> u64 {
        if block_size == 0 {
            return 0;
        }
        self.geometry.size / block_size
    }

    /// Like [`range`](Self::range) but fails when not even one block fits
    pub fn checked_range(&self, block_size: u64) -> Result<u64> {
        match self.range(block_size) {
            0 => Err(BenchError::TargetTooSmall {
                path: self.path.clone(),
                size: self.geometry.size,
                block_size,
            }),
            range => Ok(range),
        }
    }

    /// One-line description printed at startup for block devices
    pub fn summary_line(&self) -> String {
        format!(
            "{}: block size {} block count {} file size {} MBytes",
            self.path.display(),
            self.geometry.block_size,
            self.geometry.block_count,
            self.geometry.size >> 20
        )
    }
}
