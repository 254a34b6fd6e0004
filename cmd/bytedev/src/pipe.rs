//! FIFO demo: producer and consumer threads racing through one fifo.

use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bytedev_buffer::InterruptToken;
use bytedev_device::{Device, Handle, OpenFlags, fifo_registry};
use tracing::info;

pub fn run(total: usize, capacity: usize) -> Result<()> {
    let registry = fifo_registry(capacity)?;
    let dev = registry
        .lookup("fifo0")
        .context("fifo0 missing from registry")?;

    info!(total, capacity, "starting fifo pipe");
    let start = Instant::now();

    let mut writer = dev.open(OpenFlags::default());
    let producer = thread::spawn(move || -> Result<()> {
        let token = InterruptToken::new();
        let chunk: Vec<u8> = (0..=255u8).cycle().take(8192).collect();
        let mut sent = 0;
        while sent < total {
            let want = (total - sent).min(chunk.len());
            let offset = sent % 256;
            // Keep the byte pattern aligned so the consumer can verify it.
            let src: &[u8] = &chunk[offset..offset + want.min(chunk.len() - offset)];
            sent += writer.write(&src, src.len(), &token)?;
        }
        Ok(())
    });

    let mut reader = dev.open(OpenFlags::default());
    let token = InterruptToken::new();
    let mut received = 0usize;
    let mut expected = 0u8;
    let mut buf = vec![0u8; 8192];
    while received < total {
        let mut sink = buf.as_mut_slice();
        let n = reader.read(&mut sink, total - received, &token)?;
        for &b in &buf[..n] {
            if b != expected {
                bail!("byte {} was {b}, expected {expected}", received);
            }
            expected = expected.wrapping_add(1);
        }
        received += n;
    }

    match producer.join() {
        Ok(result) => result?,
        Err(_) => bail!("producer panicked"),
    }

    let elapsed = start.elapsed();
    info!(
        received,
        elapsed_ms = elapsed.as_millis() as u64,
        throughput_mb_s = (received as f64 / elapsed.as_secs_f64() / 1e6) as u64,
        "pipe complete"
    );
    Ok(())
}
