//! Error types for stream operations.

use thiserror::Error;

/// Errors that can occur in stream operations.
///
/// Every fallible operation on a stream returns one of these; success is
/// `Ok(_)`. The first five are produced by the core itself, the last four
/// originate in providers and pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The cursor is at the end of the content; the read produced no bytes.
    #[error("end of stream")]
    EndOfStream,

    /// An argument violated the operation contract: empty read buffer,
    /// releasing bytes the cursor has not passed, or an offset that would
    /// overflow the position domain.
    #[error("illegal argument")]
    IllegalArgument,

    /// The requested position is legal in form but lies outside the
    /// seekable window (released prefix, past-the-end seek, or a reset of
    /// a fully released stream).
    #[error("no such element")]
    NoSuchElement,

    /// The backing medium is temporarily unable to serve the operation.
    #[error("provider busy")]
    Busy,

    /// A long-running provider operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// A provider-side allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The provider denied access to the underlying content.
    #[error("security violation")]
    Security,

    /// The backing medium failed (I/O error, device fault, poisoned lock).
    #[error("system failure")]
    System,
}

impl StreamError {
    /// Returns `true` if retrying the same operation may succeed.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Returns `true` if this error indicates the provider is permanently
    /// unusable for the operation.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Security | Self::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StreamError::Busy.is_retryable());
        assert!(!StreamError::EndOfStream.is_retryable());
        assert!(!StreamError::NoSuchElement.is_retryable());
    }

    #[test]
    fn test_terminal_classification() {
        assert!(StreamError::Cancelled.is_terminal());
        assert!(StreamError::Security.is_terminal());
        assert!(StreamError::System.is_terminal());
        assert!(!StreamError::Busy.is_terminal());
        assert!(!StreamError::EndOfStream.is_terminal());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(StreamError::EndOfStream.to_string(), "end of stream");
        assert_eq!(StreamError::IllegalArgument.to_string(), "illegal argument");
    }
}
