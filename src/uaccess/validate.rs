//! User Region Validation
//!
//! Checks every client range against the mapped user region before any
//! byte is copied.
//!
//! # Security Principles
//! - Validate ALL client ranges before use
//! - Fail-secure: deny by default
//! - Prevent common vulnerabilities:
//!   - Buffer overflows (bounds checking)
//!   - Address wrap-around (checked arithmetic)
//!   - Null pointer dereference (explicit checks)
//!   - Partial copies (validation happens before the first byte moves)

use core::fmt;

use super::address::UserAddr;
use super::UserSpace;

/// Reason a cross-boundary access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFault {
    /// The client passed a null pointer with a non-zero length.
    NullPointer,
    /// `addr + len` wraps around the address space.
    AddressOverflow,
    /// Part of the range lies outside the client's mapped region.
    OutOfRegion,
}

impl fmt::Display for AccessFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullPointer => write!(f, "null user pointer"),
            Self::AddressOverflow => write!(f, "user range overflows address space"),
            Self::OutOfRegion => write!(f, "user range outside mapped region"),
        }
    }
}

/// A mapped, contiguous client memory region `[start, end)`.
#[derive(Debug, Clone, Copy)]
pub struct UserRegion {
    start: usize,
    end: usize,
}

impl UserRegion {
    /// Describe a client region.
    ///
    /// # Safety
    /// Every byte in `[start, end)` must stay mapped, readable and writable
    /// from the privileged side for as long as this region is used, and must
    /// not overlap the device buffer.
    pub const unsafe fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// First address of the region.
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last address of the region.
    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Validate a range the kernel will read from.
    ///
    /// # Security Checks
    /// 1. Pointer is not null
    /// 2. Start is within the region
    /// 3. Pointer + length doesn't overflow
    /// 4. End is within the region
    pub fn validate_read(&self, addr: UserAddr, len: usize) -> Result<UserBuffer, AccessFault> {
        // Zero-length ranges are always valid and never dereferenced
        if len == 0 {
            return Ok(UserBuffer {
                ptr: addr.as_usize() as *const u8,
                len: 0,
            });
        }

        if addr.is_null() {
            return Err(AccessFault::NullPointer);
        }

        let start = addr.as_usize();
        if start < self.start || start >= self.end {
            return Err(AccessFault::OutOfRegion);
        }

        let end = addr
            .checked_add(len)
            .ok_or(AccessFault::AddressOverflow)?
            .as_usize();

        if end > self.end {
            return Err(AccessFault::OutOfRegion);
        }

        Ok(UserBuffer {
            ptr: start as *const u8,
            len,
        })
    }

    /// Validate a range the kernel will write to.
    ///
    /// Same checks as [`validate_read`](Self::validate_read).
    pub fn validate_write(&self, addr: UserAddr, len: usize) -> Result<UserBufferMut, AccessFault> {
        let read_buf = self.validate_read(addr, len)?;

        Ok(UserBufferMut {
            ptr: read_buf.ptr as *mut u8,
            len: read_buf.len,
        })
    }
}

impl UserSpace for UserRegion {
    fn copy_to_user(&self, dst: UserAddr, src: &[u8]) -> Result<(), AccessFault> {
        let mut user = self.validate_write(dst, src.len())?;
        user.as_bytes_mut().copy_from_slice(src);
        Ok(())
    }

    fn copy_from_user(&self, dst: &mut [u8], src: UserAddr) -> Result<(), AccessFault> {
        let user = self.validate_read(src, dst.len())?;
        dst.copy_from_slice(user.as_bytes());
        Ok(())
    }
}

/// A validated client range the kernel may read.
///
/// Only constructed by [`UserRegion::validate_read`].
#[derive(Debug)]
pub struct UserBuffer {
    ptr: *const u8,
    len: usize,
}

impl UserBuffer {
    /// Length of the range in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the client range as bytes.
    ///
    /// The contents may change under us if the client races the copy,
    /// so callers copy out of this slice rather than keeping it.
    pub fn as_bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY:
        // - Range was checked against a UserRegion whose constructor
        //   guarantees it is mapped and readable
        // - Length was checked not to overflow
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }
}

/// A validated client range the kernel may write.
///
/// Only constructed by [`UserRegion::validate_write`].
#[derive(Debug)]
pub struct UserBufferMut {
    ptr: *mut u8,
    len: usize,
}

impl UserBufferMut {
    /// View the client range as mutable bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: Same as UserBuffer::as_bytes, plus the region is writable
        unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_over(mem: &mut [u8]) -> UserRegion {
        let start = mem.as_mut_ptr() as usize;
        // SAFETY: `mem` outlives every use of the region in these tests
        unsafe { UserRegion::new(start, start + mem.len()) }
    }

    #[test]
    fn test_zero_length() {
        let region = unsafe { UserRegion::new(0x4000_0000, 0x4008_0000) };
        assert!(region.validate_read(UserAddr::new(0x4000_1000), 0).is_ok());
        // Even null is fine when nothing is touched
        assert!(region.validate_read(UserAddr::NULL, 0).is_ok());
    }

    #[test]
    fn test_null_pointer() {
        let region = unsafe { UserRegion::new(0x4000_0000, 0x4008_0000) };
        assert_eq!(
            region.validate_read(UserAddr::NULL, 100).unwrap_err(),
            AccessFault::NullPointer
        );
    }

    #[test]
    fn test_overflow() {
        let region = unsafe { UserRegion::new(0x1000, usize::MAX) };
        assert_eq!(
            region
                .validate_read(UserAddr::new(usize::MAX - 10), 100)
                .unwrap_err(),
            AccessFault::AddressOverflow
        );
    }

    #[test]
    fn test_out_of_region() {
        let region = unsafe { UserRegion::new(0x4000_0000, 0x4008_0000) };
        assert_eq!(
            region.validate_read(UserAddr::new(0x1000), 4).unwrap_err(),
            AccessFault::OutOfRegion
        );
        // Starts inside, runs past the end
        assert_eq!(
            region
                .validate_write(UserAddr::new(0x4007_fff0), 0x20)
                .unwrap_err(),
            AccessFault::OutOfRegion
        );
    }

    #[test]
    fn test_validated_length() {
        let region = unsafe { UserRegion::new(0x4000_0000, 0x4008_0000) };
        let buf = region.validate_read(UserAddr::new(0x4000_1000), 64).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(!buf.is_empty());
        assert!(region
            .validate_read(UserAddr::new(0x4000_1000), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_copy_both_directions() {
        let mut mem = [0u8; 32];
        let region = region_over(&mut mem);
        let base = UserAddr::new(region.start());

        region.copy_to_user(base.checked_add(4).unwrap(), b"ping").unwrap();

        let mut back = [0u8; 4];
        region
            .copy_from_user(&mut back, base.checked_add(4).unwrap())
            .unwrap();
        assert_eq!(&back, b"ping");
        assert_eq!(&mem[4..8], b"ping");
    }

    #[test]
    fn test_failed_copy_touches_nothing() {
        let mut mem = [0u8; 8];
        let region = region_over(&mut mem);
        let near_end = UserAddr::new(region.end() - 2);

        assert!(region.copy_to_user(near_end, b"abcd").is_err());
        assert!(mem.iter().all(|&b| b == 0));
    }
}
