//! Transfer errors.

use core::fmt;

/// Error type for data transfers.
///
/// Never fatal: the buffer and the session cursor are unchanged when one
/// of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The client range could not be copied across the privilege boundary.
    InvalidClientMemory,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClientMemory => write!(f, "invalid client memory"),
        }
    }
}
