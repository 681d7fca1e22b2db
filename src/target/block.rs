//! Block device geometry
//!
//! Block devices report a length of zero through `stat`, so their extent is
//! read with ioctls instead:
//!
//! - `BLKSSZGET` returns the logical sector size, the unit O_DIRECT transfers
//!   must be aligned to
//! - `BLKGETSIZE64` returns the device size in bytes
//!
//! # Requirements
//!
//! - Root or appropriate permissions to open the device

use super::Geometry;
use crate::error::BenchError;
use crate::Result;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;

// ioctl request code for getting block device size in bytes
const BLKGETSIZE64: libc::c_ulong = 0x80081272;

/// Query sector size and byte size of an open block device
///
/// # Errors
///
/// Returns `DeviceQuery` naming the ioctl that failed.
pub fn probe(file: &File, path: &Path) -> Result<Geometry> {
    let sector_size = sector_size(file, path)?;
    let size = device_size(file, path)?;

    Ok(Geometry {
        size,
        block_size: sector_size,
        block_count: size / sector_size,
    })
}

fn sector_size(file: &File, path: &Path) -> Result<u64> {
    let mut sector: libc::c_int = 0;
    // SAFETY: BLKSSZGET writes a single int through the pointer
    let result = unsafe { libc::ioctl(file.as_raw_fd(), libc::BLKSSZGET, &mut sector) };

    if result < 0 {
        return Err(query_error(path, "ioctl(BLKSSZGET)", std::io::Error::last_os_error()));
    }
    if sector <= 0 {
        return Err(query_error(
            path,
            "ioctl(BLKSSZGET)",
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("device reported sector size {}", sector),
            ),
        ));
    }

    Ok(sector as u64)
}

fn device_size(file: &File, path: &Path) -> Result<u64> {
    let mut size: u64 = 0;
    // SAFETY: BLKGETSIZE64 writes a single u64 through the pointer
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64, &mut size) };

    if result < 0 {
        return Err(query_error(path, "ioctl(BLKGETSIZE64)", std::io::Error::last_os_error()));
    }

    Ok(size)
}

fn query_error(path: &Path, query: &'static str, source: std::io::Error) -> BenchError {
    BenchError::DeviceQuery {
        path: path.to_path_buf(),
        query,
        source,
    }
}
