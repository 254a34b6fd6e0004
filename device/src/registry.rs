//! Startup/shutdown registry of named device endpoints.

use std::sync::Arc;

use tracing::info;

use crate::endpoint::Device;
use crate::error::{DeviceError, Result};
use crate::fifo_dev::FifoDevice;
use crate::mem_dev::MemDevice;

/// Owns the device endpoints for the lifetime of the process.
///
/// Devices are registered once at startup and torn down by
/// [`shutdown`](Self::shutdown) in reverse registration order. There is no
/// dynamic creation or destruction in between; callers bind to an
/// instance with [`lookup`](Self::lookup) and open it from there.
#[derive(Default)]
pub struct Registry {
    devices: Vec<Arc<dyn Device>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device endpoint under its own name.
    ///
    /// Duplicate names are rejected with `InvalidArgument`.
    pub fn register(&mut self, device: Arc<dyn Device>) -> Result<()> {
        if self.devices.iter().any(|d| d.name() == device.name()) {
            return Err(DeviceError::InvalidArgument(format!(
                "device {:?} already registered",
                device.name()
            )));
        }
        info!(device = %device.name(), capacity = device.capacity(), "device registered");
        self.devices.push(device);
        Ok(())
    }

    /// Finds a registered device by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Device>> {
        self.devices
            .iter()
            .find(|d| d.name() == name)
            .map(Arc::clone)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.devices.iter().map(|d| d.name()).collect()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Destroys all endpoints in reverse order of creation.
    pub fn shutdown(&mut self) {
        while let Some(device) = self.devices.pop() {
            info!(device = %device.name(), "device shut down");
            drop(device);
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builds the classic single blocking-FIFO setup: one `fifo0` endpoint.
pub fn fifo_registry(capacity: usize) -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register(Arc::new(FifoDevice::with_capacity("fifo0", capacity)))?;
    Ok(registry)
}

/// Builds the multi-instance memory-region setup: `mem0` .. `mem{n-1}`,
/// each with independent storage.
pub fn mem_registry(instances: usize, capacity: usize) -> Result<Registry> {
    let mut registry = Registry::new();
    for i in 0..instances {
        registry.register(Arc::new(MemDevice::with_capacity(
            format!("mem{i}"),
            capacity,
        )))?;
    }
    Ok(registry)
}
