//! Secure Memory Zeroization
//!
//! Client messages pass through kernel memory twice: in the staging copy
//! taken from user space and in the device buffer itself. Both are cleared
//! with volatile writes once their bytes are no longer valid payload.
//!
//! # Design
//! - `Zeroize` trait for storage that can be securely cleared
//! - `SecureWrapper<T>` RAII type that zeros on drop
//! - Volatile writes prevent compiler optimization of zeroing

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

/// Trait for types that can be securely zeroed.
pub trait Zeroize {
    /// Overwrite this value with zeros.
    ///
    /// This operation is guaranteed to not be optimized away.
    fn zeroize(&mut self);
}

impl Zeroize for [u8] {
    fn zeroize(&mut self) {
        // SAFETY: We have a valid mutable reference to the slice
        unsafe {
            volatile_set_memory(self.as_mut_ptr(), 0, self.len());
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<const N: usize> Zeroize for [u8; N] {
    fn zeroize(&mut self) {
        self.as_mut_slice().zeroize();
    }
}

/// A wrapper that securely zeroizes its contents on drop.
///
/// Used for the staging copy of an incoming message, so the bytes are
/// wiped whether the write commits or faults.
#[derive(Debug)]
pub struct SecureWrapper<T: Zeroize> {
    inner: T,
}

impl<T: Zeroize> SecureWrapper<T> {
    /// Create a new secure wrapper around sensitive data.
    #[inline]
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Get an immutable reference to the inner value.
    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the inner value.
    #[inline]
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Zeroize> Drop for SecureWrapper<T> {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

/// Volatile memset that cannot be optimized away.
///
/// # Safety
/// - `dst` must be valid for writes of `count` bytes
#[inline]
unsafe fn volatile_set_memory(dst: *mut u8, val: u8, count: usize) {
    for i in 0..count {
        // SAFETY: Caller guarantees dst is valid for count bytes
        unsafe {
            ptr::write_volatile(dst.add(i), val);
        }
    }
}

/// Staging storage for one incoming message.
pub type StagingBuffer = SecureWrapper<[u8; crate::config::BUFFER_CAPACITY]>;
