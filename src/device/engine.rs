//! Transfer Engine
//!
//! Implements open/read/write/release against the device buffer.
//!
//! # Protocol
//! - `read` drains the buffer from the session cursor: successive reads
//!   return every payload byte exactly once, in order, then `0`
//! - `write` replaces the whole payload starting at index 0; the session
//!   cursor is not consulted
//! - Writes longer than the buffer allows are clamped without error
//!
//! # Security Considerations
//! - The buffer lock is held across the whole cross-boundary copy
//! - A faulting copy leaves both the buffer and the cursor untouched
//! - Incoming bytes are staged in a zeroize-on-drop buffer

use log::{trace, warn};

use super::buffer::DeviceBuffer;
use super::error::TransferError;
use super::session::Session;
use crate::config::{BUFFER_CAPACITY, MAX_MESSAGE_LEN};
use crate::security::StagingBuffer;
use crate::uaccess::{AccessFault, UserAddr, UserSpace};

/// File operations for the device, bound to one buffer.
#[derive(Debug, Clone, Copy)]
pub struct TransferEngine<'a> {
    buffer: &'a DeviceBuffer,
}

impl<'a> TransferEngine<'a> {
    /// Create an engine over `buffer`.
    pub const fn new(buffer: &'a DeviceBuffer) -> Self {
        Self { buffer }
    }

    /// The buffer this engine serves.
    #[inline]
    pub const fn buffer(&self) -> &'a DeviceBuffer {
        self.buffer
    }

    /// Open a new session. Never fails; any number may be open at once.
    pub fn open(&self) -> Session {
        trace!("open: new session");
        Session::open()
    }

    /// Read up to `len` bytes into client memory at `dst`.
    ///
    /// # Returns
    /// Bytes copied; `0` once the session has seen the whole payload.
    pub fn read<U: UserSpace + ?Sized>(
        &self,
        user: &U,
        session: &mut Session,
        dst: UserAddr,
        len: usize,
    ) -> Result<usize, TransferError> {
        self.read_at(user, dst, len, session.cursor_mut())
    }

    /// Read with an explicit cursor, the way a file offset is passed in.
    ///
    /// `cursor` advances by the number of bytes copied and is left alone
    /// on end-of-data or on a fault.
    pub fn read_at<U: UserSpace + ?Sized>(
        &self,
        user: &U,
        dst: UserAddr,
        len: usize,
        cursor: &mut usize,
    ) -> Result<usize, TransferError> {
        let buffer = self.buffer.lock();

        if *cursor >= buffer.len() {
            trace!("read: end of data at {}", *cursor);
            return Ok(0);
        }

        let n = len.min(buffer.len() - *cursor);
        let chunk = &buffer.payload()[*cursor..*cursor + n];
        user.copy_to_user(dst, chunk).map_err(|fault| fault_to_error("read", dst, fault))?;

        *cursor += n;
        trace!("read: {} bytes, cursor now {}", n, *cursor);
        Ok(n)
    }

    /// Store up to `len` bytes from client memory at `src` as the new message.
    ///
    /// The session's cursor plays no part: the message always starts at
    /// index 0 and replaces whatever was stored before.
    pub fn write<U: UserSpace + ?Sized>(
        &self,
        user: &U,
        _session: &Session,
        src: UserAddr,
        len: usize,
    ) -> Result<usize, TransferError> {
        self.write_from(user, src, len)
    }

    /// Session-less form of [`write`](Self::write).
    pub fn write_from<U: UserSpace + ?Sized>(
        &self,
        user: &U,
        src: UserAddr,
        len: usize,
    ) -> Result<usize, TransferError> {
        let len = len.min(MAX_MESSAGE_LEN);
        let mut staging = StagingBuffer::new([0; BUFFER_CAPACITY]);

        let mut buffer = self.buffer.lock();
        user.copy_from_user(&mut staging.inner_mut()[..len], src)
            .map_err(|fault| fault_to_error("write", src, fault))?;
        buffer.replace(&staging.inner()[..len]);

        trace!("write: stored {} bytes", len);
        Ok(len)
    }

    /// Close a session. Always succeeds and leaves the buffer alone.
    pub fn release(&self, session: Session) {
        trace!("release: session closed at cursor {}", session.cursor());
    }
}

fn fault_to_error(op: &str, addr: UserAddr, fault: AccessFault) -> TransferError {
    warn!("{}: cannot copy at {}: {}", op, addr, fault);
    TransferError::InvalidClientMemory
}
