//! Page-aligned IO buffers
//!
//! O_DIRECT transfers need the user buffer to start on an alignment boundary
//! the device accepts. Every worker owns one [`AlignedBuffer`] of exactly one
//! block, whose first byte sits on a page boundary.

use std::fmt;

/// Page size used when the OS cannot be asked
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Query the system page size
pub fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

/// Memory-aligned buffer suitable for O_DIRECT operations
///
/// Backed by a zeroed allocation of `size + alignment` bytes; the usable
/// window of `size` bytes starts at the first aligned address inside it.
pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    size: usize,
    alignment: usize,
}

impl AlignedBuffer {
    /// Create a zeroed buffer of `size` bytes aligned to `alignment`
    ///
    /// # Arguments
    /// * `size` - Size of the usable window in bytes
    /// * `alignment` - Alignment of the first byte; must be a power of two
    ///
    /// # Returns
    /// `None` if `size` is zero or `alignment` is not a power of two.
    pub fn new(size: usize, alignment: usize) -> Option<Self> {
        if size == 0 || !alignment.is_power_of_two() {
            return None;
        }

        let storage = vec![0u8; size.checked_add(alignment)?];
        let offset = storage.as_ptr().align_offset(alignment);
        if offset + size > storage.len() {
            return None;
        }

        Some(Self {
            storage,
            offset,
            size,
            alignment,
        })
    }

    /// Create a page-aligned buffer holding exactly one block
    pub fn for_block(block_size: usize) -> Option<Self> {
        Self::new(block_size, page_size())
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.as_mut_slice().as_mut_ptr()
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.size]
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.size]
    }

    /// Size of the usable window in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Verify that the buffer is properly aligned
    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.as_ptr() as usize) % self.alignment == 0
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        let size = page_size();
        assert!(size >= 512);
        assert!(size.is_power_of_two());
    }

    #[test]
    fn test_aligned_buffer_creation() {
        let buffer = AlignedBuffer::new(4096, 4096).unwrap();
        assert_eq!(buffer.size(), 4096);
        assert_eq!(buffer.alignment(), 4096);
        assert!(buffer.is_aligned());
        assert_eq!(buffer.as_slice().len(), 4096);
    }

    #[test]
    fn test_for_block_is_page_aligned() {
        for block_size in [512, 1000, 4096, 65536] {
            let buffer = AlignedBuffer::for_block(block_size).unwrap();
            assert_eq!(buffer.size(), block_size);
            assert_eq!(buffer.as_ptr() as usize % page_size(), 0);
        }
    }

    #[test]
    fn test_buffer_starts_zeroed_and_is_writable() {
        let mut buffer = AlignedBuffer::new(1024, 512).unwrap();
        assert!(buffer.as_slice().iter().all(|&b| b == 0));

        buffer.as_mut_slice()[0] = 42;
        buffer.as_mut_slice()[1023] = 99;
        assert_eq!(buffer.as_slice()[0], 42);
        assert_eq!(buffer.as_slice()[1023], 99);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AlignedBuffer::new(0, 4096).is_none());
        assert!(AlignedBuffer::new(4096, 1000).is_none());
        assert!(AlignedBuffer::new(usize::MAX, 4096).is_none());
    }
}
