//! bytedev - demo driver for the byte device endpoints.

mod mem;
mod pipe;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bytedev")]
#[command(about = "Exercise the blocking-FIFO and memory-region device endpoints")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pump a byte stream through a blocking FIFO with separate
    /// producer/consumer threads
    Pipe {
        /// Number of bytes to push through the fifo
        #[arg(long, default_value_t = 1 << 20)]
        bytes: usize,

        /// Fifo capacity in bytes
        #[arg(long, default_value_t = bytedev_device::FIFO_CAPACITY)]
        capacity: usize,
    },
    /// Run a scripted write/seek/read/clear session against a memory
    /// region device
    Mem {
        /// Region capacity in bytes
        #[arg(long, default_value_t = bytedev_device::MEM_CAPACITY)]
        capacity: usize,

        /// Number of independent region instances to register
        #[arg(long, default_value_t = 1)]
        instances: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Pipe { bytes, capacity } => pipe::run(bytes, capacity),
        Command::Mem {
            capacity,
            instances,
        } => mem::run(capacity, instances),
    }
}
