//! Test fixtures shared across modules.

use crate::uaccess::{AccessFault, UserAddr, UserRegion, UserSpace};

/// A client address space backed by host memory.
///
/// The memory is reached only through a [`UserRegion`] covering it, so
/// every copy goes through the same validation a real client sees.
pub struct FakeClient {
    mem: *mut [u8],
    region: UserRegion,
}

impl FakeClient {
    pub fn new(size: usize) -> Self {
        let mem = Box::into_raw(vec![0u8; size].into_boxed_slice());
        let start = mem as *mut u8 as usize;
        // SAFETY: `mem` stays allocated until drop and nothing else aliases it
        let region = unsafe { UserRegion::new(start, start + size) };
        Self { mem, region }
    }

    /// Client address `offset` bytes into the mapping.
    pub fn addr(&self, offset: usize) -> UserAddr {
        UserAddr::new(self.region.start() + offset)
    }

    /// An address that is never mapped.
    pub fn unmapped(&self) -> UserAddr {
        UserAddr::new(0x10)
    }

    /// Place `bytes` at `offset` and return their client address.
    pub fn load(&self, offset: usize, bytes: &[u8]) -> UserAddr {
        let addr = self.addr(offset);
        self.region.copy_to_user(addr, bytes).unwrap();
        addr
    }

    /// Copy `len` bytes starting at `addr` out of the mapping.
    pub fn bytes_at(&self, addr: UserAddr, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.region.copy_from_user(&mut out, addr).unwrap();
        out
    }
}

impl Drop for FakeClient {
    fn drop(&mut self) {
        // SAFETY: `mem` came from Box::into_raw in `new` and is freed once
        drop(unsafe { Box::from_raw(self.mem) });
    }
}

impl UserSpace for FakeClient {
    fn copy_to_user(&self, dst: UserAddr, src: &[u8]) -> Result<(), AccessFault> {
        self.region.copy_to_user(dst, src)
    }

    fn copy_from_user(&self, dst: &mut [u8], src: UserAddr) -> Result<(), AccessFault> {
        self.region.copy_from_user(dst, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_faults_come_from_region() {
        let client = FakeClient::new(16);
        let mut out = [0u8; 4];

        assert_eq!(
            client.copy_from_user(&mut out, client.unmapped()),
            Err(AccessFault::OutOfRegion)
        );
        assert_eq!(
            client.copy_from_user(&mut out, UserAddr::NULL),
            Err(AccessFault::NullPointer)
        );
        assert_eq!(
            client.copy_to_user(client.addr(14), b"abcd"),
            Err(AccessFault::OutOfRegion)
        );
    }
}
