//! The character device itself.
//!
//! - [`DeviceBuffer`]: the bounded message store, one per loaded device
//! - [`TransferEngine`]: open/read/write/release over that store
//! - [`Session`]: the per-open read cursor
//!
//! The engine is stateless with respect to registration; all it needs is
//! a reference to the buffer.

mod buffer;
mod engine;
mod error;
mod session;

pub use buffer::{DeviceBuffer, TERMINATOR};
pub use engine::TransferEngine;
pub use error::TransferError;
pub use session::Session;
