//! Flat provider: a contiguous in-memory byte region.

use crate::control::{ControlBlock, Provider, ReadChunk, ReleaseHook};
use crate::error::StreamError;
use crate::stream::ByteStream;
use std::any::Any;
use std::borrow::Cow;

/// Provider over a contiguous byte region.
///
/// The region is either borrowed from static storage (flash/ROM content)
/// or owned on the heap. Reads are straight bounded copies. Releasing a
/// prefix frees nothing here: the region is shared by every handle on the
/// control block and is dropped only when the refcount reaches zero.
pub struct FlatProvider {
    bytes: Cow<'static, [u8]>,
}

impl Provider for FlatProvider {
    #[inline]
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<ReadChunk, StreamError> {
        let start = pos as usize;
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(ReadChunk {
            written: n,
            consumed: n as u64,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory for flat streams.
///
/// Release hooks are optional and observe the two stages of teardown when
/// the last handle is dropped: `on_payload_release` fires just before the
/// byte region is dropped, `on_control_release` after the control block's
/// other state is gone.
///
/// # Example
///
/// ```
/// use bytestream_rs::FlatBuilder;
///
/// let stream = FlatBuilder::new(&b"content"[..]).build().unwrap();
/// assert_eq!(stream.remaining_size(), 7);
/// ```
pub struct FlatBuilder {
    bytes: Cow<'static, [u8]>,
    on_payload_release: Option<ReleaseHook>,
    on_control_release: Option<ReleaseHook>,
}

impl FlatBuilder {
    /// Starts a builder over the given bytes (borrowed static or owned).
    pub fn new(bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            on_payload_release: None,
            on_control_release: None,
        }
    }

    /// Registers a hook run just before the byte region is dropped.
    pub fn on_payload_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_payload_release = Some(Box::new(hook));
        self
    }

    /// Registers a hook run after the control block is torn down.
    pub fn on_control_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_control_release = Some(Box::new(hook));
        self
    }

    /// Builds the stream, returning the initial handle.
    ///
    /// An empty byte region is rejected with
    /// [`StreamError::IllegalArgument`].
    pub fn build(self) -> Result<ByteStream, StreamError> {
        if self.bytes.is_empty() {
            return Err(StreamError::IllegalArgument);
        }
        let control = ControlBlock::new(
            Box::new(FlatProvider { bytes: self.bytes }),
            self.on_payload_release,
            self.on_control_release,
        );
        Ok(ByteStream::from_control(control))
    }
}

/// Creates a flat stream over the given bytes with no release hooks.
///
/// # Example
///
/// ```
/// use bytestream_rs::flat;
///
/// let mut stream = flat(&b"0123456789"[..]).unwrap();
/// let mut buf = [0u8; 4];
/// assert_eq!(stream.read(&mut buf).unwrap(), 4);
/// assert_eq!(&buf, b"0123");
/// ```
pub fn flat(bytes: impl Into<Cow<'static, [u8]>>) -> Result<ByteStream, StreamError> {
    FlatBuilder::new(bytes).build()
}
