//! Memory-region demo: write, seek, read back, clear.

use anyhow::{Context, Result};
use bytedev_buffer::InterruptToken;
use bytedev_device::{CTL_CLEAR, Device, Handle, OpenFlags, Whence, mem_registry};
use tracing::info;

pub fn run(capacity: usize, instances: usize) -> Result<()> {
    let registry = mem_registry(instances, capacity)?;
    info!(devices = ?registry.names(), "memory regions registered");

    let dev = registry
        .lookup("mem0")
        .context("mem0 missing from registry")?;
    let token = InterruptToken::new();
    let mut handle = dev.open(OpenFlags::default());

    let message: &[u8] = b"the quick brown fox";
    let written = handle.write(&message, message.len(), &token)?;
    info!(written, "wrote message");

    handle.seek(4, Whence::Set)?;
    let mut buf = vec![0u8; 5];
    let n = handle.read(&mut buf, 5, &token)?;
    info!(read = n, text = %String::from_utf8_lossy(&buf[..n]), "read back from offset 4");

    let pos = handle.seek(-(capacity as i64), Whence::End)?;
    info!(pos, "rewound via End");

    handle.control(CTL_CLEAR, 0)?;
    let mut check = vec![0xffu8; message.len()];
    let n = handle.read(&mut check, message.len(), &token)?;
    let zeroed = check[..n].iter().all(|&b| b == 0);
    info!(read = n, zeroed, "after clear");

    Ok(())
}
