//! Composite provider: two child streams presented as one logical stream.

use crate::control::{ControlBlock, Provider, ReadChunk};
use crate::error::StreamError;
use crate::invariants::debug_assert_within_content;
use crate::stream::ByteStream;
use std::any::Any;
use std::sync::{Mutex, MutexGuard};

/// Provider composing two child streams back to back.
///
/// Content is the first child's remaining bytes followed by the second
/// child's remaining bytes, with the boundary fixed at construction. The
/// children are full stream handles of their own (possibly composites
/// themselves), shared by every handle on this control block; delegated
/// operations reposition them transactionally under the composite's lock.
///
/// A single read call never crosses the boundary, even when the caller's
/// buffer has room: the first child serves up to its end and the next call
/// resumes in the second child. This keeps conversion granularity intact
/// for converting children.
pub struct MultiProvider {
    /// Child cursors, mutated only during delegated calls under the lock.
    children: Mutex<Children>,
    /// Logical extent of the first child; positions at or past this belong
    /// to the second child.
    boundary: u64,
    /// Total content size: `boundary` plus the second child's extent.
    length: u64,
}

struct Children {
    // Declaration order is disposal order: first child, then second.
    first: ByteStream,
    second: ByteStream,
}

impl MultiProvider {
    fn lock(&self) -> Result<MutexGuard<'_, Children>, StreamError> {
        // A panic during a delegated call leaves child cursors
        // indeterminate; surface that as a medium failure.
        self.children.lock().map_err(|_| StreamError::System)
    }

    /// Forwarded release on one child, tolerant of prefixes a sibling
    /// handle already released. The child cursor may lag the outer cursor
    /// (seeks forward only the owning child), so drag it past `last`
    /// before releasing.
    fn release_child(child: &mut ByteStream, last: u64) -> Result<(), StreamError> {
        if child.position() <= last {
            match child.set_position(last + 1) {
                Ok(()) | Err(StreamError::NoSuchElement) => {}
                Err(e) => return Err(e),
            }
        }
        match child.release(last) {
            Ok(()) | Err(StreamError::NoSuchElement) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Provider for MultiProvider {
    #[inline]
    fn len(&self) -> u64 {
        self.length
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<ReadChunk, StreamError> {
        debug_assert_within_content!(pos, self.length);
        let mut children = self.lock()?;

        // The children were cloned at logical offsets 0 and `boundary`, so
        // their logical coordinates coincide with this provider's inner
        // positions and no translation is needed beyond picking the child.
        let child = if pos < self.boundary {
            &mut children.first
        } else {
            &mut children.second
        };

        child.set_position(pos)?;
        let written = child.read(buf)?;
        // Advance by source bytes consumed (the child's cursor delta), not
        // by the written count: they differ for converting children.
        let consumed = child.position() - pos;
        Ok(ReadChunk { written, consumed })
    }

    fn seek_to(&self, pos: u64) -> Result<(), StreamError> {
        let mut children = self.lock()?;
        if pos < self.boundary {
            children.first.set_position(pos)
        } else {
            children.second.set_position(pos)
        }
    }

    fn release_to(&self, last: u64) -> Result<(), StreamError> {
        let mut children = self.lock()?;
        if last < self.boundary {
            Self::release_child(&mut children.first, last)
        } else {
            if self.boundary > 0 {
                Self::release_child(&mut children.first, self.boundary - 1)?;
            }
            Self::release_child(&mut children.second, last)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Concatenates two streams into a new composed stream in O(1).
///
/// The result exposes `first`'s remaining content followed by `second`'s
/// remaining content, with its cursor at logical zero. No bytes are
/// copied: both inputs are cloned into child handles of a fresh control
/// block, so their refcounts are bumped and their external views stay
/// unchanged. Composing composites nests without special cases.
///
/// On failure no net refcount change is left behind.
///
/// # Example
///
/// ```
/// use bytestream_rs::{concat, flat};
///
/// let a = flat(&b"01234"[..]).unwrap();
/// let b = flat(&b"56789"[..]).unwrap();
/// let mut m = concat(&a, &b).unwrap();
///
/// assert_eq!(m.remaining_size(), 10);
/// let mut buf = [0u8; 10];
/// let mut got = Vec::new();
/// while let Ok(n) = m.read(&mut buf) {
///     got.extend_from_slice(&buf[..n]);
/// }
/// assert_eq!(got, b"0123456789");
/// ```
pub fn concat(first: &ByteStream, second: &ByteStream) -> Result<ByteStream, StreamError> {
    let one = first.try_clone_at(0)?;
    let boundary = one.remaining_size();
    // Rejects compositions whose total extent would overflow the position
    // domain. If this fails, dropping `one` rolls the refcount back.
    let two = second.try_clone_at(boundary)?;
    let length = boundary + two.remaining_size();

    let provider = MultiProvider {
        children: Mutex::new(Children {
            first: one,
            second: two,
        }),
        boundary,
        length,
    };
    let control = ControlBlock::new(Box::new(provider), None, None);
    Ok(ByteStream::from_control(control))
}
