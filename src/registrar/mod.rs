//! Resource Registrar
//!
//! Makes the device addressable: acquires a device number, a device class
//! and a device node, in that order, and tears them down in reverse.
//!
//! # Failure Handling
//! - A failed step releases every earlier step, newest first
//! - The error names the step that failed
//! - Teardown is best-effort: every release is attempted and the ones that
//!   failed are reported back as a [`Resources`] set

mod error;
mod guard;

use bitflags::bitflags;
use log::{error, info, warn};

pub use error::RegistrationError;

use crate::config::DeviceConfig;
use crate::host::{DeviceClassHandle, DeviceIdentity, DeviceNodeHandle, HostEnvironment};
use guard::Acquisition;

bitflags! {
    /// A set of host resources owned by one registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Resources: u8 {
        /// The device number.
        const IDENTITY = 1 << 0;
        /// The device class.
        const CLASS    = 1 << 1;
        /// The device node.
        const NODE     = 1 << 2;
    }
}

/// Everything a successful [`register`] acquired.
///
/// Hand it back to [`unregister`] (or [`Registration::unregister`]) to
/// release it.
#[must_use = "dropping a registration leaks its host resources; call unregister"]
#[derive(Debug)]
pub struct Registration {
    identity: DeviceIdentity,
    class: DeviceClassHandle,
    node: DeviceNodeHandle,
}

impl Registration {
    /// Device number the device is addressed by.
    #[inline]
    pub const fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// Class the node lives in.
    #[inline]
    pub const fn class(&self) -> DeviceClassHandle {
        self.class
    }

    /// The published node.
    #[inline]
    pub const fn node(&self) -> DeviceNodeHandle {
        self.node
    }

    /// Split into the handles [`unregister`] takes.
    pub fn into_parts(self) -> (DeviceIdentity, DeviceClassHandle, DeviceNodeHandle) {
        (self.identity, self.class, self.node)
    }

    /// Release everything this registration holds.
    pub fn unregister<H: HostEnvironment>(self, host: &mut H) -> Resources {
        let (identity, class, node) = self.into_parts();
        unregister(host, identity, class, node)
    }
}

/// Register the device with `host`.
///
/// # Steps
/// 1. Allocate a device number
/// 2. Create the device class
/// 3. Create the device node for that number inside the class
///
/// On failure nothing stays acquired.
pub fn register<H: HostEnvironment>(
    host: &mut H,
    config: &DeviceConfig,
) -> Result<Registration, RegistrationError> {
    let identity = host.alloc_identity(config.name).map_err(|err| {
        error!("{}: failed to allocate a device number: {}", config.name, err);
        RegistrationError::IdentityUnavailable
    })?;

    let mut acquired = Acquisition::new(host, identity);

    let class = acquired
        .host()
        .create_class(config.class_name)
        .map_err(|err| {
            error!("{}: failed to create class {}: {}", config.name, config.class_name, err);
            RegistrationError::ClassCreationFailed
        })?;
    acquired.record_class(class);

    let node = acquired
        .host()
        .create_node(class, identity, config.name)
        .map_err(|err| {
            error!("{}: failed to create device node: {}", config.name, err);
            RegistrationError::NodeCreationFailed
        })?;
    acquired.commit();

    info!("{}: registered with major number {}", config.name, identity.major());
    Ok(Registration {
        identity,
        class,
        node,
    })
}

/// Release a registration: node, then class, then device number.
///
/// Every step is attempted even if an earlier one fails.
///
/// # Returns
/// The resources that could not be released (empty on a clean teardown).
pub fn unregister<H: HostEnvironment>(
    host: &mut H,
    identity: DeviceIdentity,
    class: DeviceClassHandle,
    node: DeviceNodeHandle,
) -> Resources {
    let mut leaked = Resources::empty();
    leaked |= destroy_node(host, class, node);
    leaked |= destroy_class(host, class);
    leaked |= release_identity(host, identity);

    if leaked.is_empty() {
        info!("device {} unregistered", identity);
    } else {
        warn!("device {} unregistered, leaked {:?}", identity, leaked);
    }
    leaked
}

fn destroy_node<H: HostEnvironment>(
    host: &mut H,
    class: DeviceClassHandle,
    node: DeviceNodeHandle,
) -> Resources {
    match host.destroy_node(class, node) {
        Ok(()) => Resources::empty(),
        Err(err) => {
            warn!("failed to destroy device node: {}", err);
            Resources::NODE
        }
    }
}

fn destroy_class<H: HostEnvironment>(host: &mut H, class: DeviceClassHandle) -> Resources {
    match host.destroy_class(class) {
        Ok(()) => Resources::empty(),
        Err(err) => {
            warn!("failed to destroy device class: {}", err);
            Resources::CLASS
        }
    }
}

fn release_identity<H: HostEnvironment>(host: &mut H, identity: DeviceIdentity) -> Resources {
    match host.release_identity(identity) {
        Ok(()) => Resources::empty(),
        Err(err) => {
            warn!("failed to release device number {}: {}", identity, err);
            Resources::IDENTITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DeviceTable, HostError};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        AllocIdentity,
        CreateClass,
        CreateNode,
        DestroyNode,
        DestroyClass,
        ReleaseIdentity,
    }

    /// Host double that logs every call and fails on request.
    #[derive(Default)]
    struct MockHost {
        calls: Vec<Call>,
        fail_on: Vec<Call>,
        live: i32,
    }

    impl MockHost {
        fn failing(calls: &[Call]) -> Self {
            Self {
                fail_on: calls.to_vec(),
                ..Self::default()
            }
        }

        fn step(&mut self, call: Call, delta: i32) -> Result<(), HostError> {
            self.calls.push(call);
            if self.fail_on.contains(&call) {
                return Err(HostError::Exhausted);
            }
            self.live += delta;
            Ok(())
        }
    }

    impl HostEnvironment for MockHost {
        fn alloc_identity(&mut self, _name: &str) -> Result<DeviceIdentity, HostError> {
            self.step(Call::AllocIdentity, 1)?;
            Ok(DeviceIdentity::new(240, 0))
        }

        fn create_class(&mut self, _name: &str) -> Result<DeviceClassHandle, HostError> {
            self.step(Call::CreateClass, 1)?;
            Ok(DeviceClassHandle::from_raw(1))
        }

        fn create_node(
            &mut self,
            _class: DeviceClassHandle,
            _identity: DeviceIdentity,
            _name: &str,
        ) -> Result<DeviceNodeHandle, HostError> {
            self.step(Call::CreateNode, 1)?;
            Ok(DeviceNodeHandle::from_raw(2))
        }

        fn destroy_node(
            &mut self,
            _class: DeviceClassHandle,
            _node: DeviceNodeHandle,
        ) -> Result<(), HostError> {
            self.step(Call::DestroyNode, -1)
        }

        fn destroy_class(&mut self, _class: DeviceClassHandle) -> Result<(), HostError> {
            self.step(Call::DestroyClass, -1)
        }

        fn release_identity(&mut self, _identity: DeviceIdentity) -> Result<(), HostError> {
            self.step(Call::ReleaseIdentity, -1)
        }
    }

    #[test]
    fn test_register_acquires_in_order() {
        let mut host = MockHost::default();
        let reg = register(&mut host, &DeviceConfig::DEFAULT).unwrap();

        assert_eq!(
            host.calls,
            [Call::AllocIdentity, Call::CreateClass, Call::CreateNode]
        );
        assert_eq!(host.live, 3);
        assert_eq!(reg.identity(), DeviceIdentity::new(240, 0));
        assert_eq!(reg.class(), DeviceClassHandle::from_raw(1));
        assert_eq!(reg.node(), DeviceNodeHandle::from_raw(2));
    }

    #[test]
    fn test_identity_failure_releases_nothing() {
        let mut host = MockHost::failing(&[Call::AllocIdentity]);
        let err = register(&mut host, &DeviceConfig::DEFAULT).unwrap_err();

        assert_eq!(err, RegistrationError::IdentityUnavailable);
        assert_eq!(host.calls, [Call::AllocIdentity]);
        assert_eq!(host.live, 0);
    }

    #[test]
    fn test_class_failure_releases_identity() {
        let mut host = MockHost::failing(&[Call::CreateClass]);
        let err = register(&mut host, &DeviceConfig::DEFAULT).unwrap_err();

        assert_eq!(err, RegistrationError::ClassCreationFailed);
        assert_eq!(
            host.calls,
            [Call::AllocIdentity, Call::CreateClass, Call::ReleaseIdentity]
        );
        assert_eq!(host.live, 0);
    }

    #[test]
    fn test_node_failure_releases_class_then_identity() {
        let mut host = MockHost::failing(&[Call::CreateNode]);
        let err = register(&mut host, &DeviceConfig::DEFAULT).unwrap_err();

        assert_eq!(err, RegistrationError::NodeCreationFailed);
        assert_eq!(
            host.calls,
            [
                Call::AllocIdentity,
                Call::CreateClass,
                Call::CreateNode,
                Call::DestroyClass,
                Call::ReleaseIdentity,
            ]
        );
        assert_eq!(host.live, 0);
    }

    #[test]
    fn test_unregister_runs_in_reverse() {
        let mut host = MockHost::default();
        let reg = register(&mut host, &DeviceConfig::DEFAULT).unwrap();
        host.calls.clear();

        assert!(reg.unregister(&mut host).is_empty());
        assert_eq!(
            host.calls,
            [Call::DestroyNode, Call::DestroyClass, Call::ReleaseIdentity]
        );
        assert_eq!(host.live, 0);
    }

    #[test]
    fn test_unregister_is_best_effort() {
        let mut host = MockHost::default();
        let (identity, class, node) = register(&mut host, &DeviceConfig::DEFAULT)
            .unwrap()
            .into_parts();
        host.fail_on = vec![Call::DestroyNode];
        host.calls.clear();

        let leaked = unregister(&mut host, identity, class, node);

        assert_eq!(leaked, Resources::NODE);
        // Later steps still ran
        assert_eq!(
            host.calls,
            [Call::DestroyNode, Call::DestroyClass, Call::ReleaseIdentity]
        );
    }

    #[test]
    fn test_device_table_duplicate_class_rolls_back() {
        let mut table = DeviceTable::new();
        let first = register(&mut table, &DeviceConfig::DEFAULT).unwrap();
        assert_eq!(table.live_count(), 3);

        let err = register(&mut table, &DeviceConfig::DEFAULT).unwrap_err();
        assert_eq!(err, RegistrationError::ClassCreationFailed);
        assert_eq!(table.live_count(), 3);

        assert!(first.unregister(&mut table).is_empty());
        assert_eq!(table.live_count(), 0);
    }

    #[test]
    fn test_device_table_node_collision_rolls_back() {
        let mut table = DeviceTable::new();
        let first = register(&mut table, &DeviceConfig::DEFAULT).unwrap();

        let clash = DeviceConfig {
            name: DeviceConfig::DEFAULT.name,
            class_name: "Other_Class",
        };
        let err = register(&mut table, &clash).unwrap_err();
        assert_eq!(err, RegistrationError::NodeCreationFailed);
        assert_eq!(table.live_count(), 3);
        assert_eq!(
            table.lookup_node(DeviceConfig::DEFAULT.name),
            Some(first.identity())
        );
    }
}
