//! Memory-region device endpoint.

use std::sync::Arc;

use bytedev_buffer::InterruptToken;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::endpoint::{CTL_CLEAR, Device, Handle, OpenFlags, Whence};
use crate::error::{DeviceError, Result};
use crate::xfer::{SinkBuf, SourceBuf};

/// Default memory region capacity in bytes.
pub const MEM_CAPACITY: usize = 0x1000;

/// A device endpoint over one fixed, randomly addressable byte region.
///
/// This is the simple sibling of [`FifoDevice`](crate::FifoDevice): the
/// whole region is always readable, transfers never block, and each open
/// carries a position cursor moved by reads, writes and
/// [`seek`](Handle::seek). The [`CTL_CLEAR`] control opcode resets every
/// byte to zero in one atomic step.
///
/// Many independent instances may coexist; each owns its storage.
pub struct MemDevice {
    name: String,
    region: Arc<Mutex<Box<[u8]>>>,
}

impl MemDevice {
    /// Creates a memory device with the default capacity.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, MEM_CAPACITY)
    }

    /// Creates a memory device with the given capacity, zero-initialized.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        MemDevice {
            name: name.into(),
            region: Arc::new(Mutex::new(vec![0u8; capacity].into_boxed_slice())),
        }
    }
}

impl Device for MemDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capacity(&self) -> usize {
        self.region.lock().len()
    }

    fn open(&self, _flags: OpenFlags) -> Box<dyn Handle> {
        // The region never blocks, so the non-blocking flag is moot here.
        Box::new(MemHandle {
            name: self.name.clone(),
            region: Arc::clone(&self.region),
            pos: 0,
        })
    }
}

struct MemHandle {
    name: String,
    region: Arc<Mutex<Box<[u8]>>>,
    pos: usize,
}

impl Handle for MemHandle {
    fn read(
        &mut self,
        sink: &mut dyn SinkBuf,
        len: usize,
        _token: &InterruptToken,
    ) -> Result<usize> {
        let region = self.region.lock();
        if self.pos >= region.len() {
            return Ok(0);
        }
        let n = len.min(sink.len()).min(region.len() - self.pos);
        sink.copy_to(0, &region[self.pos..self.pos + n])?;
        drop(region);

        self.pos += n;
        debug!(device = %self.name, read = n, pos = self.pos, "mem read");
        Ok(n)
    }

    fn write(
        &mut self,
        source: &dyn SourceBuf,
        len: usize,
        _token: &InterruptToken,
    ) -> Result<usize> {
        let mut region = self.region.lock();
        if self.pos >= region.len() {
            return Ok(0);
        }
        let n = len.min(source.len()).min(region.len() - self.pos);

        // Stage the caller's bytes first: a copy fault must leave the
        // region exactly as it was.
        let mut staged = vec![0u8; n];
        source.copy_from(0, &mut staged)?;
        region[self.pos..self.pos + n].copy_from_slice(&staged);
        drop(region);

        self.pos += n;
        debug!(device = %self.name, written = n, pos = self.pos, "mem write");
        Ok(n)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let capacity = self.region.lock().len() as i64;
        let base = match whence {
            Whence::Set => 0,
            Whence::Current => self.pos as i64,
            Whence::End => capacity,
        };
        // An offset whose sum is not even representable is out of range
        // like any other bad target, not a fatal condition.
        let target = base.checked_add(offset);
        match target {
            Some(t) if (0..=capacity).contains(&t) => {
                self.pos = t as usize;
                Ok(self.pos as u64)
            }
            _ => Err(DeviceError::InvalidArgument(format!(
                "seek offset {offset} lands outside [0, {capacity}]"
            ))),
        }
    }

    fn control(&mut self, opcode: u32, _arg: u64) -> Result<()> {
        match opcode {
            CTL_CLEAR => {
                self.region.lock().fill(0);
                info!(device = %self.name, "region cleared to zero");
                Ok(())
            }
            other => Err(DeviceError::InvalidArgument(format!(
                "unknown control opcode {other:#x}"
            ))),
        }
    }
}
