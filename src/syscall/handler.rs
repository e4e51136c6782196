//! System Call Handler
//!
//! Dispatches device system calls and implements the individual handlers.
//!
//! # Security Considerations
//! - Unknown syscall numbers return ENOSYS
//! - Descriptors are range-checked before the table is touched
//! - Client buffers are only reached through `UserSpace`

use log::{debug, trace, warn};

use super::files::{Fd, FileTable};
use crate::device::{TransferEngine, TransferError};
use crate::uaccess::{UserAddr, UserSpace};

/// System call numbers
pub mod numbers {
    pub const SYS_OPEN: usize = 0;
    pub const SYS_READ: usize = 1;
    pub const SYS_WRITE: usize = 2;
    pub const SYS_CLOSE: usize = 3;
}

/// System call error codes
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallError {
    /// Invalid system call number
    Enosys = -38,
    /// Bad file descriptor
    Ebadf = -9,
    /// Bad address (invalid pointer)
    Efault = -14,
    /// Too many open files
    Emfile = -24,
}

impl From<TransferError> for SyscallError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidClientMemory => Self::Efault,
        }
    }
}

/// Dispatch a system call
///
/// # Arguments
/// * `engine` - Engine bound to the device buffer
/// * `files` - Open descriptors on the device
/// * `user` - Address space of the calling client
/// * `syscall_num` - System call number
/// * `args` - Raw arguments, unused ones ignored
///
/// # Returns
/// Non-negative result on success, negative errno on failure
pub fn dispatch<U: UserSpace + ?Sized>(
    engine: &TransferEngine<'_>,
    files: &FileTable,
    user: &U,
    syscall_num: usize,
    args: [usize; 3],
) -> i64 {
    let result = match syscall_num {
        numbers::SYS_OPEN => sys_open(engine, files),
        numbers::SYS_READ => sys_read(
            engine,
            files,
            user,
            args[0],                 // fd
            UserAddr::new(args[1]),  // buf
            args[2],                 // len
        ),
        numbers::SYS_WRITE => sys_write(
            engine,
            files,
            user,
            args[0],
            UserAddr::new(args[1]),
            args[2],
        ),
        numbers::SYS_CLOSE => sys_close(engine, files, args[0]),
        _ => {
            warn!("[SYSCALL] Unknown syscall: {}", syscall_num);
            Err(SyscallError::Enosys)
        }
    };

    match result {
        Ok(value) => value as i64,
        Err(err) => err as i64,
    }
}

/// Open the device.
///
/// # Returns
/// The new descriptor, or EMFILE when every slot is taken
fn sys_open(engine: &TransferEngine<'_>, files: &FileTable) -> Result<usize, SyscallError> {
    let mut slots = files.lock();
    match slots.insert(engine.open()) {
        Ok(fd) => {
            debug!("[SYSCALL] open() = {}", fd.index());
            Ok(fd.index())
        }
        Err(session) => {
            engine.release(session);
            warn!("[SYSCALL] open: descriptor table full");
            Err(SyscallError::Emfile)
        }
    }
}

/// Read from the device into a client buffer.
///
/// # Returns
/// Bytes read (0 at end of data)
fn sys_read<U: UserSpace + ?Sized>(
    engine: &TransferEngine<'_>,
    files: &FileTable,
    user: &U,
    fd: usize,
    buf: UserAddr,
    len: usize,
) -> Result<usize, SyscallError> {
    let fd = Fd::new(fd).ok_or(SyscallError::Ebadf)?;
    let mut slots = files.lock();
    let session = slots.get_mut(fd).ok_or(SyscallError::Ebadf)?;

    let n = engine.read(user, session, buf, len)?;
    trace!("[SYSCALL] read({}, {}, {}) = {}", fd.index(), buf, len, n);
    Ok(n)
}

/// Write a client buffer to the device.
///
/// # Returns
/// Bytes stored, after clamping to the buffer size
fn sys_write<U: UserSpace + ?Sized>(
    engine: &TransferEngine<'_>,
    files: &FileTable,
    user: &U,
    fd: usize,
    buf: UserAddr,
    len: usize,
) -> Result<usize, SyscallError> {
    let fd = Fd::new(fd).ok_or(SyscallError::Ebadf)?;
    let mut slots = files.lock();
    let session = slots.get_mut(fd).ok_or(SyscallError::Ebadf)?;

    let n = engine.write(user, session, buf, len)?;
    trace!("[SYSCALL] write({}, {}, {}) = {}", fd.index(), buf, len, n);
    Ok(n)
}

/// Close a descriptor.
fn sys_close(
    engine: &TransferEngine<'_>,
    files: &FileTable,
    fd: usize,
) -> Result<usize, SyscallError> {
    let fd = Fd::new(fd).ok_or(SyscallError::Ebadf)?;
    let session = files.lock().remove(fd).ok_or(SyscallError::Ebadf)?;
    engine.release(session);
    debug!("[SYSCALL] close({})", fd.index());
    Ok(0)
}
