//! Bounded byte FIFO with blocking producer/consumer semantics.
//!
//! This crate provides the concurrency core of bytedev: a fixed-capacity
//! in-memory byte buffer shared between threads, with backpressure in both
//! directions.
//!
//! - [`Region`]: the storage itself — a flat byte array plus a count of
//!   valid bytes, with no locking of its own.
//! - [`Fifo`]: the blocking gate over a `Region` — readers suspend while
//!   empty, writers suspend while full, and every completed transfer wakes
//!   the opposite side. `try_*` variants return
//!   [`FifoError::WouldBlock`] instead of suspending.
//! - [`InterruptToken`]: cancellation for blocking calls. Firing the token
//!   aborts suspended calls with [`FifoError::Interrupted`] and zero
//!   effect on the buffer.
//!
//! # Example
//!
//! ```
//! use bytedev_buffer::{Fifo, FifoError, InterruptToken};
//!
//! let fifo = Fifo::new(4);
//! let token = InterruptToken::new();
//!
//! // Short writes are success: only the free space is taken.
//! assert_eq!(fifo.write(b"abcdef", &token).unwrap(), 4);
//! assert_eq!(fifo.try_write(b"g"), Err(FifoError::WouldBlock));
//!
//! let mut out = [0u8; 8];
//! let n = fifo.read(&mut out, &token).unwrap();
//! assert_eq!(&out[..n], b"abcd");
//! ```
//!
//! # Thread safety
//!
//! [`Fifo`] is `Send + Sync` and `Clone` (clones share the same buffer).
//! The fifo's mutex is held only across the state check and the byte
//! transfer, never across a suspended wait, and there is no bound on how
//! many threads may wait on either side.

mod error;
mod fifo;
mod interrupt;
mod region;

pub use error::FifoError;
pub use fifo::{Fifo, ReadLease, WriteLease};
pub use interrupt::InterruptToken;
pub use region::Region;
