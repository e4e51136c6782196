//! Open-File Table
//!
//! Maps small integer descriptors to device sessions.
//!
//! # Design
//! - Fixed-size array of session slots
//! - A descriptor is the index of its slot
//! - Closing frees the slot for reuse

use spin::{Mutex, MutexGuard};

use crate::device::Session;

/// Number of descriptors that can be open at once.
pub const MAX_OPEN_FILES: usize = 16;

/// A descriptor handed to clients by `open`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Fd(u32);

impl Fd {
    /// Validate a raw descriptor from a client.
    ///
    /// Returns None if the value is out of range.
    #[inline]
    pub const fn new(raw: usize) -> Option<Self> {
        if raw < MAX_OPEN_FILES {
            Some(Self(raw as u32))
        } else {
            None
        }
    }

    /// Get the index value.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// All sessions currently open on the device.
pub struct FileTable {
    slots: Mutex<[Option<Session>; MAX_OPEN_FILES]>,
}

impl FileTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        const EMPTY: Option<Session> = None;
        Self {
            slots: Mutex::new([EMPTY; MAX_OPEN_FILES]),
        }
    }

    /// Number of open descriptors.
    pub fn open_count(&self) -> usize {
        self.slots.lock().iter().flatten().count()
    }

    pub(super) fn lock(&self) -> FileSlots<'_> {
        FileSlots {
            slots: self.slots.lock(),
        }
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Locked view of the table for the length of one call.
pub(super) struct FileSlots<'a> {
    slots: MutexGuard<'a, [Option<Session>; MAX_OPEN_FILES]>,
}

impl FileSlots<'_> {
    /// Store `session` in the lowest free slot.
    pub(super) fn insert(&mut self, session: Session) -> Result<Fd, Session> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(session);
                Ok(Fd(index as u32))
            }
            None => Err(session),
        }
    }

    pub(super) fn get_mut(&mut self, fd: Fd) -> Option<&mut Session> {
        self.slots[fd.index()].as_mut()
    }

    pub(super) fn remove(&mut self, fd: Fd) -> Option<Session> {
        self.slots[fd.index()].take()
    }
}
