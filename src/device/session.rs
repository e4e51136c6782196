//! Open-file sessions.
//!
//! A [`Session`] only exists between `open` and `release`, so a session
//! that was never opened or is already closed cannot be handed to a
//! transfer at all.

/// Per-open read position into the device buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    cursor: usize,
}

impl Session {
    /// A freshly opened session, positioned at the start of the buffer.
    pub(crate) const fn open() -> Self {
        Self { cursor: 0 }
    }

    /// Bytes already delivered to this session.
    #[inline]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub(crate) fn cursor_mut(&mut self) -> &mut usize {
        &mut self.cursor
    }
}
