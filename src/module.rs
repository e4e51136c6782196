//! Module Lifecycle
//!
//! Load registers the device and starts it with an empty buffer; unload
//! wipes the buffer and tears the registration down. Load and unload each
//! take the host exclusively, so they can never overlap.
//!
//! The buffer is owned by the caller and lent to the module for as long as
//! it stays loaded.

use log::{info, warn};

use crate::config::{DeviceConfig, VERSION};
use crate::device::{DeviceBuffer, TransferEngine};
use crate::host::{DeviceIdentity, HostEnvironment};
use crate::registrar::{self, Registration, RegistrationError, Resources};
use crate::syscall::{self, FileTable};
use crate::uaccess::UserSpace;

/// A loaded device: its registration, buffer and open descriptors.
#[must_use = "dropping a loaded module leaks its registration; call unload"]
pub struct ChardevModule<'a> {
    config: DeviceConfig,
    registration: Registration,
    buffer: &'a DeviceBuffer,
    files: FileTable,
}

impl<'a> ChardevModule<'a> {
    /// Register the device with `host` and serve messages from `buffer`.
    ///
    /// Whatever `buffer` held before is wiped.
    ///
    /// # Errors
    /// The registrar's error; nothing stays registered and `buffer` is
    /// left alone.
    pub fn load<H: HostEnvironment>(
        host: &mut H,
        config: DeviceConfig,
        buffer: &'a DeviceBuffer,
    ) -> Result<Self, RegistrationError> {
        let registration = registrar::register(host, &config)?;
        buffer.wipe();
        info!(
            "{} v{} loaded as device {}",
            config.name,
            VERSION,
            registration.identity()
        );

        Ok(Self {
            config,
            registration,
            buffer,
            files: FileTable::new(),
        })
    }

    /// Device number clients reach us by.
    pub fn identity(&self) -> DeviceIdentity {
        self.registration.identity()
    }

    /// Names the device was registered under.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The message buffer.
    pub fn buffer(&self) -> &'a DeviceBuffer {
        self.buffer
    }

    /// Descriptors currently open on the device.
    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// File operations over this device's buffer.
    pub fn engine(&self) -> TransferEngine<'a> {
        TransferEngine::new(self.buffer)
    }

    /// Run one system call on behalf of the client owning `user`.
    pub fn syscall<U: UserSpace + ?Sized>(
        &self,
        user: &U,
        syscall_num: usize,
        args: [usize; 3],
    ) -> i64 {
        syscall::dispatch(&self.engine(), &self.files, user, syscall_num, args)
    }

    /// Wipe the buffer and release the registration.
    ///
    /// # Returns
    /// Resources the host refused to release.
    pub fn unload<H: HostEnvironment>(self, host: &mut H) -> Resources {
        let open = self.files.open_count();
        if open > 0 {
            warn!("{}: unloading with {} descriptors open", self.config.name, open);
        }

        self.buffer.wipe();
        let leaked = self.registration.unregister(host);
        info!("{} unloaded", self.config.name);
        leaked
    }
}

impl core::fmt::Debug for ChardevModule<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChardevModule")
            .field("name", &self.config.name)
            .field("identity", &self.identity())
            .field("buffer", &self.buffer)
            .finish()
    }
}
