//! Blocking bounded byte FIFO.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::FifoError;
use crate::interrupt::InterruptToken;
use crate::region::Region;

/// A thread-safe bounded byte FIFO with blocking producers and consumers.
///
/// `Fifo` serializes all access to a single [`Region`] behind a mutex and
/// adds the blocking protocol on top: readers suspend while the buffer is
/// empty, writers suspend while it is full, and each completed transfer
/// wakes the opposite side. The mutex is held only across the state check
/// and the transfer itself, never across a suspended wait.
///
/// # Semantics
///
/// - **Read**: blocks when empty; returns up to the requested count once
///   data arrives. Short reads are success, not an error.
/// - **Write**: blocks when full; appends as many bytes as fit in one
///   transfer. Short writes are success; callers wanting more than the
///   capacity issue further calls.
/// - **Non-blocking**: the `try_*` variants return
///   [`FifoError::WouldBlock`] instead of suspending.
/// - **Interruption**: blocking calls take an [`InterruptToken`]; a fired
///   token aborts the call with [`FifoError::Interrupted`] and zero effect
///   on the buffer.
///
/// No fairness is guaranteed across waiters: a woken thread races newly
/// arriving callers to recheck the condition and may have to wait again.
///
/// # Example
///
/// ```
/// use bytedev_buffer::{Fifo, InterruptToken};
/// use std::thread;
///
/// let fifo = Fifo::new(4);
/// let producer = fifo.clone();
///
/// let handle = thread::spawn(move || {
///     let token = InterruptToken::new();
///     let mut sent = 0;
///     while sent < 8 {
///         sent += producer.write(&b"abcdefgh"[sent..], &token).unwrap();
///     }
/// });
///
/// let token = InterruptToken::new();
/// let mut out = Vec::new();
/// while out.len() < 8 {
///     let mut chunk = [0u8; 8];
///     let n = fifo.read(&mut chunk, &token).unwrap();
///     out.extend_from_slice(&chunk[..n]);
/// }
///
/// handle.join().unwrap();
/// assert_eq!(out, b"abcdefgh");
/// ```
pub struct Fifo {
    inner: Arc<Shared>,
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<Region>,
    pub(crate) not_empty: Condvar,
    pub(crate) not_full: Condvar,
}

impl Clone for Fifo {
    fn clone(&self) -> Self {
        Fifo {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Fifo {
    /// Creates a fifo with the given fixed capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Fifo {
            inner: Arc::new(Shared {
                state: Mutex::new(Region::new(capacity)),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
        }
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.inner.state.lock().available_to_read()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.inner.state.lock().capacity()
    }

    /// Returns true if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the buffer has no free space.
    pub fn is_full(&self) -> bool {
        self.inner.state.lock().is_full()
    }

    /// Atomically resets the buffer to empty and wakes blocked writers.
    pub fn clear(&self) {
        self.inner.state.lock().clear();
        self.inner.not_full.notify_all();
    }

    /// Reads up to `dst.len()` bytes, blocking while the buffer is empty.
    ///
    /// A zero-length `dst` is a degenerate success: returns 0 without
    /// blocking. Otherwise returns the number of bytes moved (at least 1),
    /// or [`FifoError::Interrupted`] if `token` fired before any data
    /// arrived.
    pub fn read(&self, dst: &mut [u8], token: &InterruptToken) -> Result<usize, FifoError> {
        if dst.is_empty() {
            return Ok(0);
        }
        let lease = self.begin_read(dst.len(), token)?;
        let n = {
            let bytes = lease.bytes();
            dst[..bytes.len()].copy_from_slice(bytes);
            bytes.len()
        };
        Ok(lease.commit(n))
    }

    /// Non-blocking read: an empty buffer yields [`FifoError::WouldBlock`].
    pub fn try_read(&self, dst: &mut [u8]) -> Result<usize, FifoError> {
        if dst.is_empty() {
            return Ok(0);
        }
        let lease = self.try_begin_read(dst.len())?;
        let n = {
            let bytes = lease.bytes();
            dst[..bytes.len()].copy_from_slice(bytes);
            bytes.len()
        };
        Ok(lease.commit(n))
    }

    /// Writes as many bytes of `src` as fit, blocking while the buffer is
    /// full.
    ///
    /// A zero-length `src` is a degenerate success. Otherwise performs one
    /// transfer of `min(src.len(), free space)` bytes (at least 1) and
    /// returns the count, or [`FifoError::Interrupted`] if `token` fired
    /// before any space freed up.
    pub fn write(&self, src: &[u8], token: &InterruptToken) -> Result<usize, FifoError> {
        if src.is_empty() {
            return Ok(0);
        }
        let mut lease = self.begin_write(src.len(), token)?;
        let n = {
            let space = lease.space();
            let n = space.len();
            space.copy_from_slice(&src[..n]);
            n
        };
        Ok(lease.commit(n))
    }

    /// Non-blocking write: a full buffer yields [`FifoError::WouldBlock`].
    pub fn try_write(&self, src: &[u8]) -> Result<usize, FifoError> {
        if src.is_empty() {
            return Ok(0);
        }
        let mut lease = self.try_begin_write(src.len())?;
        let n = {
            let space = lease.space();
            let n = space.len();
            space.copy_from_slice(&src[..n]);
            n
        };
        Ok(lease.commit(n))
    }

    /// Waits until data is available and returns a lease over it.
    ///
    /// The lease exposes up to `max` readable bytes and holds the fifo
    /// locked; nothing is consumed until [`ReadLease::commit`]. Dropping
    /// the lease uncommitted leaves the buffer exactly as it was, which is
    /// how a failed copy across a fallible boundary avoids losing bytes.
    pub fn begin_read(
        &self,
        max: usize,
        token: &InterruptToken,
    ) -> Result<ReadLease<'_>, FifoError> {
        // Register with the token before the first state check so an
        // interruption arriving between the check and the wait still wakes
        // this call.
        let _wait = token.register(&self.inner);
        let mut region = self.inner.state.lock();
        while region.available_to_read() == 0 {
            if token.is_interrupted() {
                return Err(FifoError::Interrupted);
            }
            self.inner.not_empty.wait(&mut region);
        }
        Ok(ReadLease {
            region,
            shared: &self.inner,
            max,
        })
    }

    /// Non-blocking variant of [`begin_read`](Self::begin_read).
    pub fn try_begin_read(&self, max: usize) -> Result<ReadLease<'_>, FifoError> {
        let region = self.inner.state.lock();
        if region.available_to_read() == 0 {
            return Err(FifoError::WouldBlock);
        }
        Ok(ReadLease {
            region,
            shared: &self.inner,
            max,
        })
    }

    /// Waits until space is free and returns a lease over it.
    ///
    /// The lease exposes up to `max` bytes of writable scratch space;
    /// bytes become valid payload only at [`WriteLease::commit`], so a
    /// half-finished copy into the lease leaves the buffer's contents
    /// unchanged.
    pub fn begin_write(
        &self,
        max: usize,
        token: &InterruptToken,
    ) -> Result<WriteLease<'_>, FifoError> {
        let _wait = token.register(&self.inner);
        let mut region = self.inner.state.lock();
        while region.available_to_write() == 0 {
            if token.is_interrupted() {
                return Err(FifoError::Interrupted);
            }
            self.inner.not_full.wait(&mut region);
        }
        Ok(WriteLease {
            region,
            shared: &self.inner,
            max,
        })
    }

    /// Non-blocking variant of [`begin_write`](Self::begin_write).
    pub fn try_begin_write(&self, max: usize) -> Result<WriteLease<'_>, FifoError> {
        let region = self.inner.state.lock();
        if region.available_to_write() == 0 {
            return Err(FifoError::WouldBlock);
        }
        Ok(WriteLease {
            region,
            shared: &self.inner,
            max,
        })
    }
}

/// Exclusive access to the readable prefix of a [`Fifo`].
///
/// Holds the fifo locked until committed or dropped.
pub struct ReadLease<'a> {
    region: MutexGuard<'a, Region>,
    shared: &'a Shared,
    max: usize,
}

impl ReadLease<'_> {
    /// The readable bytes, capped at the lease's `max`. Never empty.
    pub fn bytes(&self) -> &[u8] {
        let valid = self.region.peek();
        &valid[..valid.len().min(self.max)]
    }

    /// Consumes the first `n` bytes (capped at what [`bytes`](Self::bytes)
    /// exposed), releases the lock, and wakes blocked writers.
    ///
    /// Returns the number of bytes actually consumed.
    pub fn commit(mut self, n: usize) -> usize {
        let n = self.region.discard(n.min(self.max));
        drop(self.region);
        self.shared.not_full.notify_all();
        n
    }
}

/// Exclusive access to the free space of a [`Fifo`].
///
/// Holds the fifo locked until committed or dropped.
pub struct WriteLease<'a> {
    region: MutexGuard<'a, Region>,
    shared: &'a Shared,
    max: usize,
}

impl WriteLease<'_> {
    /// The writable scratch space, capped at the lease's `max`. Never
    /// empty.
    pub fn space(&mut self) -> &mut [u8] {
        let free = self.region.free_space_mut();
        let n = free.len().min(self.max);
        &mut free[..n]
    }

    /// Marks `n` bytes of the scratch space (capped) as valid payload,
    /// releases the lock, and wakes blocked readers.
    ///
    /// Returns the number of bytes actually committed.
    pub fn commit(mut self, n: usize) -> usize {
        let n = self.region.advance(n.min(self.max));
        drop(self.region);
        self.shared.not_empty.notify_all();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let fifo = Fifo::new(16);
        let token = InterruptToken::new();

        assert_eq!(fifo.write(b"hello ", &token).unwrap(), 6);
        assert_eq!(fifo.write(b"world", &token).unwrap(), 5);

        let mut out = [0u8; 16];
        let n = fifo.read(&mut out, &token).unwrap();
        assert_eq!(&out[..n], b"hello world");
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_short_write_is_exactly_free_space() {
        let fifo = Fifo::new(4);
        let token = InterruptToken::new();

        assert_eq!(fifo.write(b"ab", &token).unwrap(), 2);
        // Only two bytes of space left; never more than that is taken.
        assert_eq!(fifo.write(b"cdef", &token).unwrap(), 2);
        assert!(fifo.is_full());

        let mut out = [0u8; 1];
        fifo.read(&mut out, &token).unwrap();

        // Freed space is accepted by a later write.
        assert_eq!(fifo.write(b"e", &token).unwrap(), 1);

        let mut out = [0u8; 4];
        let n = fifo.read(&mut out, &token).unwrap();
        assert_eq!(&out[..n], b"bcde");
    }

    #[test]
    fn test_zero_length_requests() {
        let fifo = Fifo::new(4);
        let token = InterruptToken::new();

        // Degenerate success on both sides, even when blocking would
        // otherwise occur (empty read, and full write below).
        assert_eq!(fifo.read(&mut [], &token).unwrap(), 0);
        fifo.write(b"abcd", &token).unwrap();
        assert_eq!(fifo.write(&[], &token).unwrap(), 0);
        assert_eq!(fifo.try_read(&mut []).unwrap(), 0);
        assert_eq!(fifo.try_write(&[]).unwrap(), 0);
    }

    #[test]
    fn test_try_read_empty_would_block() {
        let fifo = Fifo::new(4);
        let mut out = [0u8; 4];
        assert_eq!(fifo.try_read(&mut out), Err(FifoError::WouldBlock));
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_try_write_full_would_block() {
        let fifo = Fifo::new(2);
        let token = InterruptToken::new();
        fifo.write(b"ab", &token).unwrap();

        assert_eq!(fifo.try_write(b"c"), Err(FifoError::WouldBlock));
        assert_eq!(fifo.len(), 2);

        let mut out = [0u8; 2];
        fifo.read(&mut out, &token).unwrap();
        assert_eq!(&out, b"ab");
    }

    #[test]
    fn test_blocking_read_unblocked_by_write() {
        let fifo = Fifo::new(8);
        let reader = fifo.clone();

        let handle = thread::spawn(move || {
            let token = InterruptToken::new();
            let mut out = [0u8; 8];
            let n = reader.read(&mut out, &token).unwrap();
            (n, out)
        });

        // Give the reader time to block.
        thread::sleep(Duration::from_millis(20));
        fifo.write(b"abc", &InterruptToken::new()).unwrap();

        let (n, out) = handle.join().unwrap();
        // Exactly the three written bytes, and the buffer is drained.
        assert_eq!(n, 3);
        assert_eq!(&out[..n], b"abc");
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_blocking_write_unblocked_by_read() {
        let fifo = Fifo::new(2);
        let token = InterruptToken::new();
        fifo.write(b"ab", &token).unwrap();

        let writer = fifo.clone();
        let handle = thread::spawn(move || {
            let token = InterruptToken::new();
            writer.write(b"cd", &token).unwrap()
        });

        thread::sleep(Duration::from_millis(20));
        let mut out = [0u8; 1];
        fifo.read(&mut out, &token).unwrap();

        // Writer wakes and fills the single freed byte.
        assert_eq!(handle.join().unwrap(), 1);
        assert!(fifo.is_full());
    }

    #[test]
    fn test_interrupt_blocked_read() {
        let fifo = Fifo::new(4);
        let token = InterruptToken::new();

        let reader = fifo.clone();
        let reader_token = token.clone();
        let handle = thread::spawn(move || {
            let mut out = [0u8; 4];
            reader.read(&mut out, &reader_token)
        });

        thread::sleep(Duration::from_millis(20));
        token.interrupt();

        assert_eq!(handle.join().unwrap(), Err(FifoError::Interrupted));
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_interrupt_blocked_write_leaves_len_unchanged() {
        let fifo = Fifo::new(2);
        fifo.write(b"ab", &InterruptToken::new()).unwrap();

        let token = InterruptToken::new();
        let writer = fifo.clone();
        let writer_token = token.clone();
        let handle = thread::spawn(move || writer.write(b"cd", &writer_token));

        thread::sleep(Duration::from_millis(20));
        token.interrupt();

        assert_eq!(handle.join().unwrap(), Err(FifoError::Interrupted));
        assert_eq!(fifo.len(), 2);

        // The fifo itself is unaffected: a fresh token still works.
        let mut out = [0u8; 2];
        let n = fifo.read(&mut out, &InterruptToken::new()).unwrap();
        assert_eq!(&out[..n], b"ab");
    }

    #[test]
    fn test_fired_token_aborts_before_suspending() {
        let fifo = Fifo::new(4);
        let token = InterruptToken::new();
        token.interrupt();

        let mut out = [0u8; 4];
        assert_eq!(fifo.read(&mut out, &token), Err(FifoError::Interrupted));

        // Data already available is still served; the token only matters
        // when the call would have to wait.
        fifo.try_write(b"xy").unwrap();
        assert_eq!(fifo.read(&mut out, &token).unwrap(), 2);

        token.reset();
        assert_eq!(fifo.write(b"ab", &token).unwrap(), 2);
    }

    #[test]
    fn test_clear_wakes_blocked_writer() {
        let fifo = Fifo::new(2);
        fifo.write(b"ab", &InterruptToken::new()).unwrap();

        let writer = fifo.clone();
        let handle = thread::spawn(move || {
            let token = InterruptToken::new();
            writer.write(b"cd", &token).unwrap()
        });

        thread::sleep(Duration::from_millis(20));
        fifo.clear();

        assert_eq!(handle.join().unwrap(), 2);
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn test_request_larger_than_capacity_completes_in_short_transfers() {
        let fifo = Fifo::new(4);
        let payload: Vec<u8> = (0u8..32).collect();

        let producer = fifo.clone();
        let src = payload.clone();
        let handle = thread::spawn(move || {
            let token = InterruptToken::new();
            let mut sent = 0;
            while sent < src.len() {
                sent += producer.write(&src[sent..], &token).unwrap();
            }
        });

        let token = InterruptToken::new();
        let mut out = Vec::new();
        while out.len() < payload.len() {
            let mut chunk = [0u8; 16];
            let n = fifo.read(&mut chunk, &token).unwrap();
            out.extend_from_slice(&chunk[..n]);
        }

        handle.join().unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_many_producers_many_consumers() {
        let fifo = Fifo::new(8);
        let per_thread = 500usize;
        let producers = 4;

        let mut handles = Vec::new();
        for _ in 0..producers {
            let fifo = fifo.clone();
            handles.push(thread::spawn(move || {
                let token = InterruptToken::new();
                let mut sent = 0;
                while sent < per_thread {
                    sent += fifo.write(&vec![7u8; per_thread - sent], &token).unwrap();
                }
            }));
        }

        let total = per_thread * producers;
        let mut consumers = Vec::new();
        let received = Arc::new(Mutex::new(0usize));
        for _ in 0..2 {
            let fifo = fifo.clone();
            let received = Arc::clone(&received);
            consumers.push(thread::spawn(move || {
                loop {
                    {
                        let mut got = received.lock();
                        if *got >= total {
                            break;
                        }
                        let mut chunk = [0u8; 16];
                        if let Ok(n) = fifo.try_read(&mut chunk) {
                            assert!(chunk[..n].iter().all(|&b| b == 7));
                            *got += n;
                            continue;
                        }
                    }
                    thread::yield_now();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }
        for c in consumers {
            c.join().unwrap();
        }
        assert_eq!(*received.lock(), total);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_read_lease_drop_preserves_bytes() {
        let fifo = Fifo::new(8);
        let token = InterruptToken::new();
        fifo.write(b"abc", &token).unwrap();

        {
            let lease = fifo.begin_read(8, &token).unwrap();
            assert_eq!(lease.bytes(), b"abc");
            // Dropped without commit: nothing consumed.
        }
        assert_eq!(fifo.len(), 3);

        let lease = fifo.begin_read(2, &token).unwrap();
        assert_eq!(lease.bytes(), b"ab");
        assert_eq!(lease.commit(2), 2);
        assert_eq!(fifo.len(), 1);
    }

    #[test]
    fn test_write_lease_drop_commits_nothing() {
        let fifo = Fifo::new(8);
        let token = InterruptToken::new();

        {
            let mut lease = fifo.begin_write(4, &token).unwrap();
            lease.space().copy_from_slice(b"abcd");
            // Dropped without commit: the bytes stay stale.
        }
        assert!(fifo.is_empty());

        let mut lease = fifo.begin_write(4, &token).unwrap();
        lease.space().copy_from_slice(b"wxyz");
        assert_eq!(lease.commit(4), 4);

        let mut out = [0u8; 8];
        let n = fifo.read(&mut out, &token).unwrap();
        assert_eq!(&out[..n], b"wxyz");
    }
}
