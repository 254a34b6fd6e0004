//! Error taxonomy for device calls.

use bytedev_buffer::FifoError;

use crate::xfer::CopyFault;

/// Result alias for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// A failed device call.
///
/// Every failure here is scoped to the call that produced it; none is
/// fatal to the device instance. Partial transfers are not errors at all —
/// read and write report them through their returned count.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// A non-blocking call could not proceed immediately. Retry later.
    #[error("operation would block")]
    WouldBlock,
    /// A blocking call was interrupted before it transferred anything.
    /// The caller may retry.
    #[error("interrupted while waiting")]
    Interrupted,
    /// A bad seek target or an unrecognized control opcode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The cross-boundary copy failed because the caller's buffer was not
    /// accessible. Bytes committed by earlier calls are not rolled back.
    #[error("caller buffer is not accessible")]
    IoFault,
}

impl From<FifoError> for DeviceError {
    fn from(err: FifoError) -> Self {
        match err {
            FifoError::WouldBlock => DeviceError::WouldBlock,
            FifoError::Interrupted => DeviceError::Interrupted,
        }
    }
}

impl From<CopyFault> for DeviceError {
    fn from(_: CopyFault) -> Self {
        DeviceError::IoFault
    }
}
