//! Device-like endpoints over in-memory byte buffers.
//!
//! This crate maps a host's open/read/write/seek/control surface onto the
//! buffers from `bytedev-buffer`. Two endpoint shapes share one contract:
//!
//! - [`FifoDevice`]: a single blocking byte FIFO. Reads block while empty,
//!   writes block while full; a non-blocking open turns both into
//!   [`DeviceError::WouldBlock`]. No cursor, no control opcodes.
//! - [`MemDevice`]: a fixed randomly addressable region. Never blocks;
//!   each open carries a seekable position cursor, and [`CTL_CLEAR`]
//!   resets the region to zeroes.
//!
//! Endpoints live in a [`Registry`] owned by the process entry point:
//! registered once at startup, destroyed in reverse order at shutdown.
//!
//! Caller data crosses through the [`SourceBuf`]/[`SinkBuf`] traits — the
//! stand-in for a host's safe cross-boundary copy — so a hostile or
//! vanished caller buffer surfaces as [`DeviceError::IoFault`] without
//! corrupting device state.
//!
//! # Example
//!
//! ```
//! use bytedev_device::{fifo_registry, Device, DeviceError, Handle, OpenFlags};
//! use bytedev_buffer::InterruptToken;
//!
//! let registry = fifo_registry(64).unwrap();
//! let dev = registry.lookup("fifo0").unwrap();
//! let token = InterruptToken::new();
//!
//! let mut writer = dev.open(OpenFlags::default());
//! let src: &[u8] = b"ping";
//! writer.write(&src, 4, &token).unwrap();
//!
//! let mut reader = dev.open(OpenFlags::nonblocking());
//! let mut buf = [0u8; 8];
//! let mut sink = buf.as_mut_slice();
//! let n = reader.read(&mut sink, 8, &token).unwrap();
//! assert_eq!(&buf[..n], b"ping");
//!
//! // Empty again: the non-blocking open reports WouldBlock.
//! let mut sink = buf.as_mut_slice();
//! assert_eq!(reader.read(&mut sink, 8, &token), Err(DeviceError::WouldBlock));
//! ```

mod endpoint;
mod error;
mod fifo_dev;
mod mem_dev;
mod registry;
mod xfer;

pub use endpoint::{CTL_CLEAR, Device, Handle, OpenFlags, Whence};
pub use error::{DeviceError, Result};
pub use fifo_dev::{FIFO_CAPACITY, FifoDevice};
pub use mem_dev::{MEM_CAPACITY, MemDevice};
pub use registry::{Registry, fifo_registry, mem_registry};
pub use xfer::{CopyFault, SinkBuf, SourceBuf};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devices_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FifoDevice>();
        assert_send_sync::<MemDevice>();
        assert_send_sync::<Registry>();
    }
}
