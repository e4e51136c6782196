//! User Memory Access
//!
//! Moves bytes across the privilege boundary. The kernel never keeps a
//! reference into client memory; it copies in or out through [`UserSpace`].
//!
//! # Security Model
//! - Client addresses are a distinct type ([`UserAddr`])
//! - Every range is validated before the first byte moves
//! - A failed copy leaves the kernel-side destination untouched

mod address;
mod validate;

pub use address::UserAddr;
pub use validate::{AccessFault, UserBuffer, UserBufferMut, UserRegion};

/// A client address space the kernel can copy to and from.
///
/// Implementations must either move all requested bytes or fail without
/// writing any of them.
pub trait UserSpace {
    /// Copy `src` into client memory at `dst`.
    fn copy_to_user(&self, dst: UserAddr, src: &[u8]) -> Result<(), AccessFault>;

    /// Fill `dst` from client memory at `src`.
    fn copy_from_user(&self, dst: &mut [u8], src: UserAddr) -> Result<(), AccessFault>;
}

impl<U: UserSpace + ?Sized> UserSpace for &U {
    fn copy_to_user(&self, dst: UserAddr, src: &[u8]) -> Result<(), AccessFault> {
        (**self).copy_to_user(dst, src)
    }

    fn copy_from_user(&self, dst: &mut [u8], src: UserAddr) -> Result<(), AccessFault> {
        (**self).copy_from_user(dst, src)
    }
}
