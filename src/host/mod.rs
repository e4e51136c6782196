//! Host Environment Boundary
//!
//! The registrar needs three things from the environment it runs in: a
//! device number, a device class and a device node. [`HostEnvironment`]
//! is the acquire/release interface over those, so the registrar can be
//! driven by the in-memory [`DeviceTable`] or by a test double.
//!
//! # Handles
//! All handles are opaque tokens handed out by the host. They are only
//! meaningful to the host that issued them.

mod table;

use core::fmt;

pub use table::{DeviceTable, MAX_CLASSES, MAX_MAJORS, MAX_NODES, NAME_MAX};

/// Device number assigned at registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    major: u32,
    minor: u32,
}

impl DeviceIdentity {
    /// Build an identity from a major/minor pair.
    #[inline]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Driver number.
    #[inline]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Instance number within the driver.
    #[inline]
    pub const fn minor(self) -> u32 {
        self.minor
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceIdentity({}:{})", self.major, self.minor)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// The device class the node is published under.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct DeviceClassHandle(u32);

impl DeviceClassHandle {
    /// Wrap a host-specific class token.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The host-specific token.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The externally visible device node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct DeviceNodeHandle(u32);

impl DeviceNodeHandle {
    /// Wrap a host-specific node token.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The host-specific token.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Reason the host refused an acquire or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// No free slot of the requested kind.
    Exhausted,
    /// A resource with that name already exists.
    AlreadyExists,
    /// The handle does not name a live resource.
    NotFound,
    /// The resource still has dependents.
    Busy,
    /// The name is empty or too long.
    InvalidName,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no free slot"),
            Self::AlreadyExists => write!(f, "name already in use"),
            Self::NotFound => write!(f, "no such resource"),
            Self::Busy => write!(f, "resource still in use"),
            Self::InvalidName => write!(f, "invalid name"),
        }
    }
}

/// Acquire/release interface to the environment the device lives in.
///
/// Resources are acquired identity → class → node and must be released
/// in the reverse order.
pub trait HostEnvironment {
    /// Reserve a device number for `name`.
    fn alloc_identity(&mut self, name: &str) -> Result<DeviceIdentity, HostError>;

    /// Create the device class `name`.
    fn create_class(&mut self, name: &str) -> Result<DeviceClassHandle, HostError>;

    /// Publish the node `name` for `identity` under `class`.
    fn create_node(
        &mut self,
        class: DeviceClassHandle,
        identity: DeviceIdentity,
        name: &str,
    ) -> Result<DeviceNodeHandle, HostError>;

    /// Remove a published node.
    fn destroy_node(
        &mut self,
        class: DeviceClassHandle,
        node: DeviceNodeHandle,
    ) -> Result<(), HostError>;

    /// Remove a device class.
    fn destroy_class(&mut self, class: DeviceClassHandle) -> Result<(), HostError>;

    /// Give a device number back.
    fn release_identity(&mut self, identity: DeviceIdentity) -> Result<(), HostError>;
}
