//! Blocking-FIFO device endpoint.

use bytedev_buffer::{Fifo, InterruptToken};
use tracing::debug;

use crate::endpoint::{Device, Handle, OpenFlags, Whence};
use crate::error::{DeviceError, Result};
use crate::xfer::{SinkBuf, SourceBuf};

/// Default FIFO capacity in bytes.
pub const FIFO_CAPACITY: usize = 0x1000;

/// A device endpoint over one blocking byte FIFO.
///
/// There is exactly one buffer instance per device; every open shares it.
/// Reads block while the fifo is empty and writes block while it is full,
/// unless the open was non-blocking. The endpoint has no position cursor:
/// seeking fails, and no control opcodes are recognized.
pub struct FifoDevice {
    name: String,
    fifo: Fifo,
}

impl FifoDevice {
    /// Creates a FIFO device with the default capacity.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, FIFO_CAPACITY)
    }

    /// Creates a FIFO device with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        FifoDevice {
            name: name.into(),
            fifo: Fifo::new(capacity),
        }
    }

    /// The underlying fifo shared by all opens. Test-side inspection
    /// only; callers go through [`Handle`].
    pub(crate) fn fifo(&self) -> &Fifo {
        &self.fifo
    }
}

impl Device for FifoDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capacity(&self) -> usize {
        self.fifo.capacity()
    }

    fn open(&self, flags: OpenFlags) -> Box<dyn Handle> {
        Box::new(FifoHandle {
            name: self.name.clone(),
            fifo: self.fifo.clone(),
            nonblocking: flags.nonblocking,
        })
    }
}

struct FifoHandle {
    name: String,
    fifo: Fifo,
    nonblocking: bool,
}

impl Handle for FifoHandle {
    fn read(
        &mut self,
        sink: &mut dyn SinkBuf,
        len: usize,
        token: &InterruptToken,
    ) -> Result<usize> {
        let len = len.min(sink.len());
        if len == 0 {
            return Ok(0);
        }

        let lease = if self.nonblocking {
            self.fifo.try_begin_read(len)?
        } else {
            self.fifo.begin_read(len, token)?
        };

        // Copy out before committing the consume, so a copy fault loses
        // nothing: the lease drops and the bytes stay buffered.
        let n = {
            let bytes = lease.bytes();
            sink.copy_to(0, bytes)?;
            bytes.len()
        };
        let n = lease.commit(n);
        debug!(device = %self.name, read = n, remaining = self.fifo.len(), "fifo read");
        Ok(n)
    }

    fn write(
        &mut self,
        source: &dyn SourceBuf,
        len: usize,
        token: &InterruptToken,
    ) -> Result<usize> {
        let len = len.min(source.len());
        if len == 0 {
            return Ok(0);
        }

        let mut lease = if self.nonblocking {
            self.fifo.try_begin_write(len)?
        } else {
            self.fifo.begin_write(len, token)?
        };

        // The lease's scratch space holds nothing valid yet; a copy fault
        // drops the lease and the fifo contents are untouched.
        let n = {
            let space = lease.space();
            source.copy_from(0, space)?;
            space.len()
        };
        let n = lease.commit(n);
        debug!(device = %self.name, written = n, buffered = self.fifo.len(), "fifo write");
        Ok(n)
    }

    fn seek(&mut self, _offset: i64, _whence: Whence) -> Result<u64> {
        Err(DeviceError::InvalidArgument(
            "fifo device has no position cursor".into(),
        ))
    }

    fn control(&mut self, opcode: u32, _arg: u64) -> Result<()> {
        Err(DeviceError::InvalidArgument(format!(
            "unknown control opcode {opcode:#x}"
        )))
    }
}
