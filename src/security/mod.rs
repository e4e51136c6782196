//! Security Primitives Module
//!
//! - Secret zeroization on drop
//! - Volatile clearing of stale message bytes
//!
//! # Security Properties
//! - Message bytes no longer part of the payload are always zeroed
//! - Memory is cleared using volatile writes to prevent optimization

pub mod zeroize;

pub use zeroize::{SecureWrapper, StagingBuffer, Zeroize};
