//! Device Message Buffer
//!
//! Fixed-capacity storage shared by every open session.
//!
//! # Invariants
//! - `len <= MAX_MESSAGE_LEN`
//! - `data[len]` is always the terminator byte
//! - Only `data[..len]` is payload; every byte past the terminator is zero
//!
//! Length and bytes live behind one spinlock so a reader never sees a
//! length from one write paired with bytes from another.

use spin::{Mutex, MutexGuard};

use crate::config::{BUFFER_CAPACITY, MAX_MESSAGE_LEN};
use crate::security::Zeroize;

/// Value stored right after the payload.
pub const TERMINATOR: u8 = 0;

/// Buffer state, only reachable through the lock.
pub(crate) struct BufferInner {
    data: [u8; BUFFER_CAPACITY],
    len: usize,
}

impl BufferInner {
    const fn new() -> Self {
        Self {
            data: [0; BUFFER_CAPACITY],
            len: 0,
        }
    }

    /// Number of valid payload bytes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The valid payload.
    #[inline]
    pub(crate) fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Replace the whole payload with `msg`.
    ///
    /// Bytes of the previous payload beyond the new terminator are zeroed.
    pub(crate) fn replace(&mut self, msg: &[u8]) {
        debug_assert!(msg.len() <= MAX_MESSAGE_LEN);
        let old_len = self.len;
        let new_len = msg.len();

        self.data[..new_len].copy_from_slice(msg);
        self.data[new_len] = TERMINATOR;
        if old_len > new_len {
            self.data[new_len + 1..=old_len].zeroize();
        }
        self.len = new_len;
    }

    fn wipe(&mut self) {
        self.data.zeroize();
        self.len = 0;
    }
}

/// The device's message buffer.
///
/// Owned by whoever loads the device and handed to the
/// [`TransferEngine`](super::TransferEngine) by reference.
pub struct DeviceBuffer {
    inner: Mutex<BufferInner>,
}

impl DeviceBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(BufferInner::new()),
        }
    }

    /// Total capacity, terminator included.
    #[inline]
    pub const fn capacity(&self) -> usize {
        BUFFER_CAPACITY
    }

    /// Current payload length.
    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    /// Whether no message is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the current payload into `out`, returning the payload length.
    ///
    /// At most `out.len()` bytes are copied.
    pub fn copy_payload(&self, out: &mut [u8]) -> usize {
        let inner = self.inner.lock();
        let n = inner.len.min(out.len());
        out[..n].copy_from_slice(&inner.data[..n]);
        inner.len
    }

    /// Zero every byte and drop the stored message.
    pub fn wipe(&self) {
        self.inner.lock().wipe();
    }

    /// Take the buffer lock for the length of one transfer.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BufferInner> {
        self.inner.lock()
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> [u8; BUFFER_CAPACITY] {
        self.inner.lock().data
    }
}

impl Default for DeviceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DeviceBuffer(len={}/{})", self.len(), BUFFER_CAPACITY)
    }
}
