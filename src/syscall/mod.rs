//! System Call Interface
//!
//! The POSIX-style surface clients use to reach the device.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls are allowed
//! - All parameters are validated before use
//! - Invalid inputs return errors, never panic
//!
//! # Current Syscalls
//! - 0: open() - open the device, returns a descriptor
//! - 1: read(fd, buf, len) - drain the message from the descriptor's cursor
//! - 2: write(fd, buf, len) - replace the message
//! - 3: close(fd) - release the descriptor

mod files;
mod handler;

pub use files::{Fd, FileTable, MAX_OPEN_FILES};
pub use handler::{dispatch, numbers, SyscallError};
