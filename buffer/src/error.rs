//! Error types for fifo operations.

/// Outcome of a fifo transfer that could not move any bytes.
///
/// Neither variant is fatal to the fifo itself: `WouldBlock` means the
/// caller should retry once the other side has made progress, and
/// `Interrupted` means a blocking call was cancelled before it transferred
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FifoError {
    /// A non-blocking call found the buffer empty (read) or full (write).
    #[error("operation would block")]
    WouldBlock,
    /// A blocking call was interrupted while waiting; no bytes were moved.
    #[error("interrupted while waiting")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FifoError::WouldBlock), "operation would block");
        assert_eq!(
            format!("{}", FifoError::Interrupted),
            "interrupted while waiting"
        );
    }
}
