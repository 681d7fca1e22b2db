//! Synchronous IO engine
//!
//! Uses blocking `pread`/`pwrite`, so workers sharing one descriptor never
//! disturb each other's file offset.
//!
//! # Features
//!
//! - Positioned IO without changing the shared file offset
//! - Works with O_DIRECT and O_SYNC descriptors
//! - Exactly one syscall per operation; short transfers are reported as-is

use super::{IoEngine, IoOperation};
use crate::config::workload::OperationKind;
use std::io;

/// Synchronous IO engine using pread/pwrite
#[derive(Debug, Default)]
pub struct SyncEngine;

impl SyncEngine {
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    fn do_read(fd: i32, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        // SAFETY: the buffer is a valid, exclusively borrowed region of
        // buffer.len() bytes for the duration of the call
        let result = unsafe {
            libc::pread(
                fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                offset_arg(offset)?,
            )
        };
        check(result)
    }

    #[inline(always)]
    fn do_write(fd: i32, buffer: &[u8], offset: u64) -> io::Result<usize> {
        // SAFETY: the buffer is a valid region of buffer.len() bytes
        let result = unsafe {
            libc::pwrite(
                fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
                offset_arg(offset)?,
            )
        };
        check(result)
    }
}

impl IoEngine for SyncEngine {
    fn execute(&mut self, op: IoOperation<'_>) -> io::Result<usize> {
        match op.kind {
            OperationKind::Read => Self::do_read(op.fd, op.buffer, op.offset),
            OperationKind::Write => Self::do_write(op.fd, op.buffer, op.offset),
        }
    }

    fn name(&self) -> &'static str {
        "sync"
    }
}

fn offset_arg(offset: u64) -> io::Result<libc::off_t> {
    libc::off_t::try_from(offset).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("offset {} exceeds off_t", offset),
        )
    })
}

/// Classify a signed syscall result
#[inline(always)]
fn check(result: isize) -> io::Result<usize> {
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;
    use tempfile::NamedTempFile;

    fn patterned_file(len: usize) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(file.path(), data).unwrap();
        file
    }

    #[test]
    fn test_read_at_offset() {
        let file = patterned_file(8192);
        let handle = std::fs::File::open(file.path()).unwrap();
        let mut engine = SyncEngine::new();
        let mut buffer = vec![0u8; 4096];

        let n = engine
            .execute(IoOperation {
                kind: OperationKind::Read,
                fd: handle.as_raw_fd(),
                offset: 4096,
                buffer: &mut buffer,
            })
            .unwrap();

        assert_eq!(n, 4096);
        assert_eq!(buffer[0], (4096 % 251) as u8);
    }

    #[test]
    fn test_write_then_read_back() {
        let file = patterned_file(8192);
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(file.path())
            .unwrap();
        let mut engine = SyncEngine::new();

        let mut data = vec![0xEEu8; 512];
        let n = engine
            .execute(IoOperation {
                kind: OperationKind::Write,
                fd: handle.as_raw_fd(),
                offset: 1024,
                buffer: &mut data,
            })
            .unwrap();
        assert_eq!(n, 512);

        let contents = std::fs::read(file.path()).unwrap();
        assert!(contents[1024..1536].iter().all(|&b| b == 0xEE));
        assert_eq!(contents.len(), 8192);
    }

    #[test]
    fn test_short_read_is_not_an_error() {
        let file = patterned_file(6000);
        let handle = std::fs::File::open(file.path()).unwrap();
        let mut engine = SyncEngine::new();
        let mut buffer = vec![0u8; 4096];

        let n = engine
            .execute(IoOperation {
                kind: OperationKind::Read,
                fd: handle.as_raw_fd(),
                offset: 4096,
                buffer: &mut buffer,
            })
            .unwrap();
        assert_eq!(n, 6000 - 4096);

        let n = engine
            .execute(IoOperation {
                kind: OperationKind::Read,
                fd: handle.as_raw_fd(),
                offset: 6000,
                buffer: &mut buffer,
            })
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_write_on_read_only_descriptor_fails() {
        let file = patterned_file(4096);
        let handle = std::fs::File::open(file.path()).unwrap();
        let mut engine = SyncEngine::new();
        let mut data = vec![1u8; 512];

        let err = engine
            .execute(IoOperation {
                kind: OperationKind::Write,
                fd: handle.as_raw_fd(),
                offset: 0,
                buffer: &mut data,
            })
            .unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn test_check_classifies_sign() {
        assert_eq!(check(0).unwrap(), 0);
        assert_eq!(check(4096).unwrap(), 4096);
        assert!(offset_arg(u64::MAX).is_err());
    }
}
