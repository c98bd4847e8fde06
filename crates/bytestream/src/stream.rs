//! Per-consumer stream handles over shared, reference-counted content.

use crate::control::{ControlBlock, Provider};
use crate::error::StreamError;
use crate::invariants::{debug_assert_consumed_bounded, debug_assert_window_ordered};
use crate::metrics::MetricsSnapshot;
use crate::multi;
use crossbeam_utils::Backoff;
use std::sync::Arc;

/// A read cursor over immutable, shared byte content.
///
/// Content is exposed by a [`Provider`] behind a reference-counted control
/// block; a `ByteStream` is one consumer's view of it. The view is a
/// sliding window over logical positions:
///
/// - **released** — positions before the last acknowledged prefix;
///   unreadable,
/// - **pending** — already read but still re-readable via
///   [`set_position`](Self::set_position) or [`reset`](Self::reset),
/// - **future** — the next [`read`](Self::read) draws from here.
///
/// Logical positions are `inner + offset_diff` where inner positions index
/// the provider content; the mapping is fixed per handle at creation.
///
/// A single handle must not be used from more than one thread at a time.
/// To share content across threads, clone the handle: every clone carries
/// its own cursor, and the content plus control block are shared and
/// dropped exactly once when the last handle goes away.
///
/// # Example
///
/// ```
/// use bytestream_rs::flat;
///
/// let mut stream = flat(&b"0123456789"[..]).unwrap();
/// let mut buf = [0u8; 4];
///
/// assert_eq!(stream.read(&mut buf).unwrap(), 4);
/// assert_eq!(&buf, b"0123");
/// assert_eq!(stream.position(), 4);
///
/// // rewind within the pending window
/// stream.set_position(2).unwrap();
/// assert_eq!(stream.read(&mut buf).unwrap(), 4);
/// assert_eq!(&buf, b"2345");
/// ```
pub struct ByteStream {
    control: Arc<ControlBlock>,
    /// Mapping between logical and inner positions (wrapping arithmetic).
    offset: u64,
    /// Inner position below which bytes are released.
    first_valid: u64,
    /// Inner position of the next byte a read will produce.
    current: u64,
    /// Provider content size, fixed when this handle was created.
    length: u64,
}

impl ByteStream {
    /// Wraps a custom [`Provider`] into a stream with a fresh control
    /// block and no release hooks. The returned handle is the initial
    /// reference; medium-specific backends (flash, file, network,
    /// converting content) enter the stream world here.
    pub fn from_provider(provider: impl Provider) -> Self {
        Self::from_control(ControlBlock::new(Box::new(provider), None, None))
    }

    /// Initial handle over a freshly built control block: logical zero at
    /// inner zero, nothing released, nothing consumed.
    pub(crate) fn from_control(control: Arc<ControlBlock>) -> Self {
        let length = control.provider().len();
        Self {
            control,
            offset: 0,
            first_valid: 0,
            current: 0,
            length,
        }
    }

    // ---------------------------------------------------------------------
    // CURSOR
    // ---------------------------------------------------------------------

    /// Moves the cursor to logical position `pos`.
    ///
    /// `pos` must lie inside the seekable window: past the released prefix
    /// and at most one past the last content byte (seeking to the end is
    /// legal; the next read reports [`StreamError::EndOfStream`]). Anything
    /// else returns [`StreamError::NoSuchElement`] and leaves the cursor
    /// untouched.
    pub fn set_position(&mut self, pos: u64) -> Result<(), StreamError> {
        let inner = pos.wrapping_sub(self.offset);
        if inner > self.length || inner < self.first_valid {
            return Err(StreamError::NoSuchElement);
        }
        self.control.provider().seek_to(inner)?;
        self.current = inner;
        debug_assert_window_ordered!(self.first_valid, self.current, self.length);
        Ok(())
    }

    /// Moves the cursor back to the start of the pending window: the
    /// position just after the last released byte, or logical start if
    /// nothing was released.
    ///
    /// Returns [`StreamError::NoSuchElement`] when the whole content has
    /// been released and there is nothing left to re-read.
    pub fn reset(&mut self) -> Result<(), StreamError> {
        if self.first_valid == self.length {
            return Err(StreamError::NoSuchElement);
        }
        self.current = self.first_valid;
        Ok(())
    }

    /// Logical position of the next byte a read will produce.
    #[inline]
    pub fn position(&self) -> u64 {
        self.current.wrapping_add(self.offset)
    }

    /// Number of content bytes between the cursor and the end.
    #[inline]
    pub fn remaining_size(&self) -> u64 {
        self.length - self.current
    }

    // ---------------------------------------------------------------------
    // READ
    // ---------------------------------------------------------------------

    /// Reads sequential bytes into `buf`, advancing the cursor.
    ///
    /// Returns the number of bytes written into `buf`. The cursor advances
    /// by the number of *source* bytes consumed, which converting providers
    /// may report differently from the written count.
    ///
    /// Errors: [`StreamError::IllegalArgument`] for an empty `buf` (the
    /// cursor does not move), [`StreamError::EndOfStream`] once the cursor
    /// is at the end, and provider errors unchanged.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if buf.is_empty() {
            return Err(StreamError::IllegalArgument);
        }
        if self.current == self.length {
            return Err(StreamError::EndOfStream);
        }

        let chunk = self.control.provider().read_at(self.current, buf)?;
        debug_assert_consumed_bounded!(chunk.consumed, self.length - self.current);

        self.current += chunk.consumed;
        debug_assert_window_ordered!(self.first_valid, self.current, self.length);

        self.control.metrics().add_read(chunk.written as u64);
        Ok(chunk.written)
    }

    /// Reads with adaptive backoff while the provider reports
    /// [`StreamError::Busy`]. Spins, yields, then gives up returning the
    /// last `Busy`.
    pub fn read_with_backoff(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let backoff = Backoff::new();
        loop {
            match self.read(buf) {
                Err(StreamError::Busy) if !backoff.is_completed() => backoff.snooze(),
                other => return other,
            }
        }
    }

    // ---------------------------------------------------------------------
    // RELEASE
    // ---------------------------------------------------------------------

    /// Acknowledges every byte up to and including logical position `pos`;
    /// the prefix becomes unreachable for this handle.
    ///
    /// The boundary is inclusive, unlike the exclusive cursor positions:
    /// `release(p)` covers `[start, p]` and the pending window afterwards
    /// begins at `p + 1`.
    ///
    /// Errors: [`StreamError::IllegalArgument`] when `pos` has not been
    /// passed by the cursor yet, [`StreamError::NoSuchElement`] when the
    /// prefix is already released.
    pub fn release(&mut self, pos: u64) -> Result<(), StreamError> {
        let last = pos.wrapping_sub(self.offset);
        let new_first = last.wrapping_add(1);
        if new_first > self.current {
            return Err(StreamError::IllegalArgument);
        }
        if new_first <= self.first_valid {
            return Err(StreamError::NoSuchElement);
        }

        self.control.provider().release_to(last)?;
        self.first_valid = new_first;
        debug_assert_window_ordered!(self.first_valid, self.current, self.length);

        self.control.metrics().add_release();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // SHARING
    // ---------------------------------------------------------------------

    /// Creates an independent handle whose cursor starts where this one
    /// stands, remapped so that its logical position reads `offset`.
    ///
    /// The new handle shares the content (the control-block refcount is
    /// bumped) but owns its cursor: its pending window starts empty and
    /// operations on either handle never move the other's cursor.
    ///
    /// Returns [`StreamError::IllegalArgument`] when `offset` plus the
    /// remaining size would overflow the position domain.
    pub fn try_clone_at(&self, offset: u64) -> Result<Self, StreamError> {
        if offset.checked_add(self.length - self.current).is_none() {
            return Err(StreamError::IllegalArgument);
        }
        self.control.metrics().add_clone();
        Ok(Self {
            control: Arc::clone(&self.control),
            offset: offset.wrapping_sub(self.current),
            first_valid: self.current,
            current: self.current,
            length: self.length,
        })
    }

    /// Concatenates `self`'s remaining content with `second`'s remaining
    /// content into a new composed stream. O(1); no bytes are copied and
    /// both inputs keep their external view unchanged.
    pub fn concat(&self, second: &ByteStream) -> Result<ByteStream, StreamError> {
        multi::concat(self, second)
    }

    /// Number of live handles sharing this control block.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.control)
    }

    /// Returns `true` iff the content behind this handle is served by a
    /// provider of type `P`.
    pub fn is_provider<P: Provider>(&self) -> bool {
        self.control.provider().as_any().is::<P>()
    }

    /// Snapshot of the operation counters shared by all handles on this
    /// control block.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.control.metrics().snapshot()
    }
}

impl Clone for ByteStream {
    /// Same as [`try_clone_at`](Self::try_clone_at) at the current logical
    /// position: the mapping is preserved, the pending window collapses.
    /// Unlike an arbitrary offset this can never overflow, so plain `Clone`
    /// is total.
    fn clone(&self) -> Self {
        self.control.metrics().add_clone();
        Self {
            control: Arc::clone(&self.control),
            offset: self.offset,
            first_valid: self.current,
            current: self.current,
            length: self.length,
        }
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("position", &self.position())
            .field("remaining", &self.remaining_size())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

// Dropping a handle is the dispose operation: the control-block refcount
// drops with the Arc, and the last drop runs the release hooks.
