//! Registration errors.

use core::fmt;

/// Error type for device registration.
///
/// Each variant names the step that failed. By the time one is returned
/// every resource acquired by earlier steps has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// The host had no device number for us.
    IdentityUnavailable,
    /// The device class could not be created.
    ClassCreationFailed,
    /// The device node could not be created.
    NodeCreationFailed,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityUnavailable => write!(f, "failed to allocate a device number"),
            Self::ClassCreationFailed => write!(f, "failed to create the device class"),
            Self::NodeCreationFailed => write!(f, "failed to create the device node"),
        }
    }
}
