//! The host-facing device contract.
//!
//! A [`Device`] is a named endpoint bound to one buffer instance for its
//! whole lifetime. [`Device::open`] yields a [`Handle`] carrying the only
//! per-open state there is: the open flags and, for seekable devices, a
//! position cursor. Closing is dropping the handle.

use bytedev_buffer::InterruptToken;

use crate::error::Result;
use crate::xfer::{SinkBuf, SourceBuf};

/// Control opcode: reset the device's region to all zeroes.
///
/// Recognized only by the memory-region device; everything else is an
/// invalid argument.
pub const CTL_CLEAR: u32 = 0x01;

/// Per-open flags supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// When set, read and write return `WouldBlock` instead of suspending.
    pub nonblocking: bool,
}

impl OpenFlags {
    /// Flags for a non-blocking open.
    pub fn nonblocking() -> Self {
        OpenFlags { nonblocking: true }
    }
}

/// Origin for a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute offset from the start of the region.
    Set,
    /// Relative to the current position.
    Current,
    /// Relative to the end of the region (the capacity).
    End,
}

/// A named device endpoint bound to one buffer instance.
pub trait Device: Send + Sync {
    /// The endpoint's registered name.
    fn name(&self) -> &str;

    /// The fixed capacity of the bound buffer instance.
    fn capacity(&self) -> usize;

    /// Opens the device, binding a handle to the instance.
    fn open(&self, flags: OpenFlags) -> Box<dyn Handle>;
}

/// One open of a [`Device`].
///
/// Handles are independent: each carries its own flags and cursor but all
/// handles of a device share the same bound instance.
pub trait Handle: Send {
    /// Reads up to `len` bytes into the caller's buffer.
    ///
    /// Returns the number of bytes transferred; fewer than requested is
    /// success (the short read carries all that was available).
    fn read(&mut self, sink: &mut dyn SinkBuf, len: usize, token: &InterruptToken)
    -> Result<usize>;

    /// Writes up to `len` bytes from the caller's buffer.
    ///
    /// Returns the number of bytes transferred; short writes are success.
    fn write(&mut self, source: &dyn SourceBuf, len: usize, token: &InterruptToken)
    -> Result<usize>;

    /// Moves the position cursor. Devices without one reject this with
    /// `InvalidArgument`. Returns the new position.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64>;

    /// Generic control call. Unrecognized opcodes are `InvalidArgument`.
    fn control(&mut self, opcode: u32, arg: u64) -> Result<()>;
}
