//! chardev - Single-Buffer Character Device
//!
//! A privileged-mode I/O endpoint: one named device exposing
//! open/read/write/close to unprivileged clients, backed by a bounded
//! message buffer that lives outside every client's address space.
//!
//! # Layout
//! - [`registrar`]: identity → class → node acquisition with ordered rollback
//! - [`device`]: the transfer engine, the shared buffer and per-open sessions
//! - [`uaccess`]: typed user addresses and cross-boundary copies
//! - [`host`]: the host-environment boundary and an in-memory device table
//! - [`syscall`]: POSIX-style dispatch returning negative errno values
//! - [`module`]: load/unload lifecycle tying the pieces together
//!
//! # Security Features
//! - Client pointers are validated before any byte crosses the boundary
//! - Buffer length and contents are updated under one lock
//! - Stale message bytes are zeroized on overwrite and on unload

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod device;
pub mod host;
pub mod logging;
pub mod module;
pub mod registrar;
pub mod security;
pub mod syscall;
pub mod uaccess;

#[cfg(test)]
mod testing;

pub use config::{DeviceConfig, BUFFER_CAPACITY, CLASS_NAME, DEVICE_NAME};
pub use device::{DeviceBuffer, Session, TransferEngine, TransferError};
pub use module::ChardevModule;
pub use registrar::{register, unregister, Registration, RegistrationError, Resources};
