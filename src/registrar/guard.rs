//! Scoped acquisition with reverse-order rollback.
//!
//! An [`Acquisition`] records each resource as it is acquired. Dropping it
//! releases them class → identity; [`Acquisition::commit`] hands ownership
//! to the caller instead. The node is the last step, so a guard never has
//! to roll one back.

use log::{debug, warn};

use super::Resources;
use crate::host::{DeviceClassHandle, DeviceIdentity, HostEnvironment};

pub(super) struct Acquisition<'h, H: HostEnvironment> {
    host: &'h mut H,
    identity: DeviceIdentity,
    class: Option<DeviceClassHandle>,
}

impl<'h, H: HostEnvironment> Acquisition<'h, H> {
    /// Start tracking from an already acquired identity.
    pub(super) fn new(host: &'h mut H, identity: DeviceIdentity) -> Self {
        Self {
            host,
            identity,
            class: None,
        }
    }

    pub(super) fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    pub(super) fn record_class(&mut self, class: DeviceClassHandle) {
        self.class = Some(class);
    }

    /// What this guard currently owns.
    pub(super) fn held(&self) -> Resources {
        let mut held = Resources::IDENTITY;
        held.set(Resources::CLASS, self.class.is_some());
        held
    }

    /// Keep everything acquired so far; nothing is released.
    pub(super) fn commit(self) {
        core::mem::forget(self);
    }
}

impl<H: HostEnvironment> Drop for Acquisition<'_, H> {
    fn drop(&mut self) {
        debug!("rolling back {:?}", self.held());
        let mut leaked = Resources::empty();
        if let Some(class) = self.class {
            leaked |= super::destroy_class(&mut *self.host, class);
        }
        leaked |= super::release_identity(&mut *self.host, self.identity);
        if !leaked.is_empty() {
            warn!("rollback could not release {:?}", leaked);
        }
    }
}
