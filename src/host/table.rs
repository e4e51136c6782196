//! In-Memory Device Table
//!
//! A [`HostEnvironment`] that keeps device numbers, classes and nodes in
//! fixed-size slot arrays.
//!
//! # Design
//! - Device numbers are allocated dynamically; major 0 is never handed out
//! - Class and node names are unique within their table
//! - A class or device number with nodes still attached cannot be released,
//!   so teardown has to run node → class → identity

use super::{DeviceClassHandle, DeviceIdentity, DeviceNodeHandle, HostEnvironment, HostError};

/// Longest name the table stores, in bytes.
pub const NAME_MAX: usize = 32;

/// Number of major slots (slot 0 is reserved).
pub const MAX_MAJORS: usize = 32;

/// Number of class slots.
pub const MAX_CLASSES: usize = 8;

/// Number of node slots.
pub const MAX_NODES: usize = 16;

/// First major handed out by dynamic allocation.
const FIRST_DYNAMIC_MAJOR: usize = 1;

/// Inline, fixed-capacity name.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Name {
    bytes: [u8; NAME_MAX],
    len: usize,
}

impl Name {
    fn new(name: &str) -> Result<Self, HostError> {
        if name.is_empty() || name.len() > NAME_MAX {
            return Err(HostError::InvalidName);
        }
        let mut bytes = [0u8; NAME_MAX];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            bytes,
            len: name.len(),
        })
    }

    fn as_str(&self) -> &str {
        // Built from a &str, so always valid UTF-8
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

#[derive(Clone, Copy)]
struct NodeEntry {
    name: Name,
    class: u32,
    identity: DeviceIdentity,
}

/// Slot-array implementation of the host environment.
pub struct DeviceTable {
    majors: [Option<Name>; MAX_MAJORS],
    classes: [Option<Name>; MAX_CLASSES],
    nodes: [Option<NodeEntry>; MAX_NODES],
}

impl DeviceTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            majors: [None; MAX_MAJORS],
            classes: [None; MAX_CLASSES],
            nodes: [None; MAX_NODES],
        }
    }

    /// Resolve a node name to the device it addresses.
    pub fn lookup_node(&self, name: &str) -> Option<DeviceIdentity> {
        self.nodes
            .iter()
            .flatten()
            .find(|node| node.name.as_str() == name)
            .map(|node| node.identity)
    }

    /// Name registered for `major`, if any.
    pub fn device_name(&self, major: u32) -> Option<&str> {
        self.majors
            .get(major as usize)
            .and_then(|slot| slot.as_ref())
            .map(Name::as_str)
    }

    /// Number of live identities, classes and nodes.
    pub fn live_count(&self) -> usize {
        let majors = self.majors.iter().flatten().count();
        let classes = self.classes.iter().flatten().count();
        let nodes = self.nodes.iter().flatten().count();
        majors + classes + nodes
    }

    fn class_in_use(&self, class: u32) -> bool {
        self.nodes.iter().flatten().any(|node| node.class == class)
    }

    fn identity_in_use(&self, identity: DeviceIdentity) -> bool {
        self.nodes.iter().flatten().any(|node| node.identity == identity)
    }
}

/// First empty slot at or after `start_from`.
fn find_free<T>(slots: &[Option<T>], start_from: usize) -> Option<usize> {
    (start_from..slots.len()).find(|&i| slots[i].is_none())
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEnvironment for DeviceTable {
    fn alloc_identity(&mut self, name: &str) -> Result<DeviceIdentity, HostError> {
        let name = Name::new(name)?;
        let major = find_free(&self.majors, FIRST_DYNAMIC_MAJOR).ok_or(HostError::Exhausted)?;
        self.majors[major] = Some(name);
        Ok(DeviceIdentity::new(major as u32, 0))
    }

    fn create_class(&mut self, name: &str) -> Result<DeviceClassHandle, HostError> {
        let name = Name::new(name)?;
        if self.classes.iter().flatten().any(|class| *class == name) {
            return Err(HostError::AlreadyExists);
        }
        let slot = find_free(&self.classes, 0).ok_or(HostError::Exhausted)?;
        self.classes[slot] = Some(name);
        Ok(DeviceClassHandle::from_raw(slot as u32))
    }

    fn create_node(
        &mut self,
        class: DeviceClassHandle,
        identity: DeviceIdentity,
        name: &str,
    ) -> Result<DeviceNodeHandle, HostError> {
        let name = Name::new(name)?;
        let class_live = matches!(self.classes.get(class.raw() as usize), Some(Some(_)));
        let identity_live = matches!(self.majors.get(identity.major() as usize), Some(Some(_)));
        if !class_live || !identity_live {
            return Err(HostError::NotFound);
        }
        if self.nodes.iter().flatten().any(|node| node.name == name) {
            return Err(HostError::AlreadyExists);
        }
        let slot = find_free(&self.nodes, 0).ok_or(HostError::Exhausted)?;
        self.nodes[slot] = Some(NodeEntry {
            name,
            class: class.raw(),
            identity,
        });
        Ok(DeviceNodeHandle::from_raw(slot as u32))
    }

    fn destroy_node(
        &mut self,
        class: DeviceClassHandle,
        node: DeviceNodeHandle,
    ) -> Result<(), HostError> {
        let index = node.raw() as usize;
        let owned_by_class = matches!(
            self.nodes.get(index),
            Some(Some(entry)) if entry.class == class.raw()
        );
        if !owned_by_class {
            return Err(HostError::NotFound);
        }
        self.nodes[index] = None;
        Ok(())
    }

    fn destroy_class(&mut self, class: DeviceClassHandle) -> Result<(), HostError> {
        let index = class.raw() as usize;
        if !matches!(self.classes.get(index), Some(Some(_))) {
            return Err(HostError::NotFound);
        }
        if self.class_in_use(class.raw()) {
            return Err(HostError::Busy);
        }
        self.classes[index] = None;
        Ok(())
    }

    fn release_identity(&mut self, identity: DeviceIdentity) -> Result<(), HostError> {
        let index = identity.major() as usize;
        if identity.minor() != 0 || !matches!(self.majors.get(index), Some(Some(_))) {
            return Err(HostError::NotFound);
        }
        if self.identity_in_use(identity) {
            return Err(HostError::Busy);
        }
        self.majors[index] = None;
        Ok(())
    }
}
