//! Cross-boundary copies between caller memory and device internals.
//!
//! Device endpoints never touch the caller's buffer directly: all data
//! crosses through [`SourceBuf`] (caller memory the device reads from on
//! write) and [`SinkBuf`] (caller memory the device writes into on read).
//! In-process callers get these for free via the slice impls; a host
//! embedding the devices behind a real isolation boundary supplies its
//! own.
//!
//! A copy failure is reported as [`CopyFault`] and surfaces from device
//! calls as `DeviceError::IoFault`. The endpoints sequence their copies so
//! that a fault never corrupts internal state: copy-in lands in scratch
//! space before any commit, and copy-out happens before the consumed
//! bytes are released.

/// The caller's buffer could not be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("caller buffer is not accessible")]
pub struct CopyFault;

/// Caller memory the device copies from (the write path).
pub trait SourceBuf {
    /// Total bytes the caller is offering.
    fn len(&self) -> usize;

    /// Returns true if the caller is offering no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`.
    fn copy_from(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyFault>;
}

/// Caller memory the device copies into (the read path).
pub trait SinkBuf {
    /// Total bytes the caller can accept.
    fn len(&self) -> usize;

    /// Returns true if the caller cannot accept any bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies all of `src` to the caller's memory starting at `offset`.
    fn copy_to(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyFault>;
}

impl SourceBuf for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_from(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyFault> {
        let end = offset.checked_add(dst.len()).ok_or(CopyFault)?;
        let src = self.get(offset..end).ok_or(CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl SourceBuf for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn copy_from(&self, offset: usize, dst: &mut [u8]) -> Result<(), CopyFault> {
        self.as_slice().copy_from(offset, dst)
    }
}

impl SinkBuf for &mut [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyFault> {
        let end = offset.checked_add(src.len()).ok_or(CopyFault)?;
        let dst = self.get_mut(offset..end).ok_or(CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl SinkBuf for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn copy_to(&mut self, offset: usize, src: &[u8]) -> Result<(), CopyFault> {
        self.as_mut_slice().copy_to(offset, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let src: &[u8] = b"abcdef";
        let mut out = [0u8; 3];
        src.copy_from(2, &mut out).unwrap();
        assert_eq!(&out, b"cde");

        // Out-of-range access faults instead of panicking.
        assert_eq!(src.copy_from(5, &mut out), Err(CopyFault));
    }

    #[test]
    fn test_slice_sink() {
        let mut buf = [0u8; 6];
        let mut sink = buf.as_mut_slice();
        sink.copy_to(1, b"xyz").unwrap();
        assert_eq!(sink.copy_to(5, b"ab"), Err(CopyFault));
        assert_eq!(&buf, b"\0xyz\0\0");
    }

    #[test]
    fn test_vec_sink() {
        let mut buf = vec![0u8; 4];
        buf.copy_to(0, b"abcd").unwrap();
        assert_eq!(buf, b"abcd");
        // A Vec sink does not grow; it is a window, not an accumulator.
        assert_eq!(buf.copy_to(2, b"xyz"), Err(CopyFault));
    }
}
