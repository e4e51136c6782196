//! Compile-time device configuration.

/// Driver version string
pub const VERSION: &str = "0.1.0";

/// Name the device is registered under (visible in the device list and /dev)
pub const DEVICE_NAME: &str = "Omkar_Device";

/// Name of the device class the node is created in
pub const CLASS_NAME: &str = "Omkar_Class";

/// Total size of the message buffer, terminator included.
pub const BUFFER_CAPACITY: usize = 256;

/// Largest payload a single write can store; one byte is kept for the terminator.
pub const MAX_MESSAGE_LEN: usize = BUFFER_CAPACITY - 1;

/// Names used when registering the device with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device (and node) name.
    pub name: &'static str,
    /// Device class name.
    pub class_name: &'static str,
}

impl DeviceConfig {
    /// The driver's built-in names.
    pub const DEFAULT: Self = Self {
        name: DEVICE_NAME,
        class_name: CLASS_NAME,
    };
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
