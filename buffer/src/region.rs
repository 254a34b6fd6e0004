//! Fixed-capacity flat byte store.

/// A fixed-capacity byte region with a count of valid bytes.
///
/// `Region` is the storage half of the fifo: a flat, zero-initialized byte
/// array where exactly the first `len` bytes are valid payload, ordered
/// oldest first. Bytes beyond `len` are stale and carry no meaning.
///
/// `Region` performs no locking of its own. Callers that share one between
/// threads must already hold exclusive access for every call; [`Fifo`]
/// wraps a `Region` in a mutex and provides exactly that.
///
/// Appends and consumes truncate rather than fail: the returned count is
/// authoritative and may be smaller than requested.
///
/// [`Fifo`]: crate::Fifo
#[derive(Debug)]
pub struct Region {
    buf: Box<[u8]>,
    len: usize,
}

impl Region {
    /// Creates a zero-initialized region with the given fixed capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Region {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Returns the fixed capacity of the region.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of valid bytes, i.e. how many a read could take.
    pub fn available_to_read(&self) -> usize {
        self.len
    }

    /// Returns the free space, i.e. how many bytes a write could add.
    pub fn available_to_write(&self) -> usize {
        self.buf.len() - self.len
    }

    /// Returns true if the region holds no valid bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the region has no free space.
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Appends bytes at offset `len`, truncating to the free space.
    ///
    /// Returns the number of bytes actually copied in. Never fails; a full
    /// region yields 0.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.available_to_write());
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        n
    }

    /// Removes bytes from the front into `dst`, compacting the remainder.
    ///
    /// Copies out the first `min(dst.len(), len)` bytes, shifts what is
    /// left to offset 0, and returns the count. An empty region yields 0.
    pub fn consume(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len);
        dst[..n].copy_from_slice(&self.buf[..n]);
        self.discard(n)
    }

    /// Returns the valid prefix without consuming it.
    ///
    /// Together with [`discard`](Self::discard) this splits a consume into
    /// an inspect step and a commit step, so a caller copying across a
    /// fallible boundary can leave the region untouched on failure.
    pub fn peek(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Drops the first `n` valid bytes (capped at `len`) and compacts.
    ///
    /// Returns the number of bytes actually dropped.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
        n
    }

    /// Returns the stale tail as writable scratch space.
    ///
    /// Bytes written here become valid only once [`advance`](Self::advance)
    /// commits them, so a half-finished copy into this slice leaves the
    /// region's valid contents unchanged.
    pub fn free_space_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// Marks `n` bytes of the free space (capped) as valid payload.
    ///
    /// Returns the number of bytes actually committed.
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.available_to_write());
        self.len += n;
        n
    }

    /// Resets the region to empty.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}
