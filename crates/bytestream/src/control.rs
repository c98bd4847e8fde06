//! The provider contract and the shared, reference-counted control block.

use crate::error::StreamError;
use crate::metrics::Metrics;
use std::any::Any;
use std::sync::Arc;

/// Byte counts reported by a single provider read.
///
/// The two counts differ for converting providers (a base64 decoder writes
/// fewer bytes than it consumes); for plain storage they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadChunk {
    /// Bytes written into the caller's buffer.
    pub written: usize,
    /// Source bytes consumed from the content. The owning handle advances
    /// its cursor by this amount.
    pub consumed: u64,
}

/// Callback run exactly once when the control block refcount reaches zero.
///
/// The payload hook runs before the payload is dropped, the control-block
/// hook after. Statically allocated content typically registers no hook.
pub type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// The polymorphic contract a stream provider implements.
///
/// Cursor bookkeeping is uniform across providers and lives in
/// [`ByteStream`](crate::ByteStream); a provider only serves bytes for an
/// inner position range and may veto seeks or observe releases (the
/// composite provider forwards both to its children). Positions passed to
/// the hooks are inner positions in `[0, len()]`.
///
/// Providers must be shareable: payload bytes are immutable after
/// construction, and any internal cursor state a provider keeps must be
/// synchronized by the provider itself.
pub trait Provider: Send + Sync + 'static {
    /// Total number of content bytes this provider exposes.
    fn len(&self) -> u64;

    /// Produce bytes starting at inner position `pos` into `buf`.
    ///
    /// Called with `pos < len()` and a non-empty `buf`. A provider may
    /// return [`StreamError::IllegalArgument`] when `buf` is below its
    /// minimum conversion granularity, or any medium error
    /// (`Busy`, `Cancelled`, `Security`, `System`), which the handle
    /// passes through unchanged.
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> Result<ReadChunk, StreamError>;

    /// Called before the owning handle moves its cursor to `pos`
    /// (`pos ≤ len()`). An error leaves the handle's cursor untouched.
    fn seek_to(&self, pos: u64) -> Result<(), StreamError> {
        let _ = pos;
        Ok(())
    }

    /// Called after the owning handle marked every byte up to and including
    /// inner position `pos` as released. Plain storage keeps the bytes
    /// until the refcount reaches zero and does nothing here.
    fn release_to(&self, pos: u64) -> Result<(), StreamError> {
        let _ = pos;
        Ok(())
    }

    /// Dynamic identity for provider type checks.
    fn as_any(&self) -> &dyn Any;
}

/// Shared record binding a provider to its release hooks.
///
/// One control block exists per stream content; every handle holds an
/// `Arc` to it, so the refcount is the `Arc` strong count (atomic bump on
/// clone, acquire/release decrement on drop — the releasing thread sees
/// all prior writes before the hooks run).
pub(crate) struct ControlBlock {
    // Option only so Drop can sequence the provider between the two hooks.
    provider: Option<Box<dyn Provider>>,
    metrics: Metrics,
    on_payload_release: Option<ReleaseHook>,
    on_control_release: Option<ReleaseHook>,
}

impl ControlBlock {
    pub(crate) fn new(
        provider: Box<dyn Provider>,
        on_payload_release: Option<ReleaseHook>,
        on_control_release: Option<ReleaseHook>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider: Some(provider),
            metrics: Metrics::new(),
            on_payload_release,
            on_control_release,
        })
    }

    #[inline]
    pub(crate) fn provider(&self) -> &dyn Provider {
        // present for the whole life of the block; taken only in Drop
        self.provider.as_deref().expect("provider missing")
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl Drop for ControlBlock {
    fn drop(&mut self) {
        // Release order is fixed: payload hook, payload, control-block hook.
        // The block's own memory is freed by the owning Arc afterwards.
        if let Some(hook) = self.on_payload_release.take() {
            hook();
        }
        self.provider.take();
        if let Some(hook) = self.on_control_release.take() {
            hook();
        }
    }
}

impl std::fmt::Debug for ControlBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlBlock")
            .field("len", &self.provider().len())
            .field("has_payload_hook", &self.on_payload_release.is_some())
            .field("has_control_hook", &self.on_control_release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct NullProvider;

    impl Provider for NullProvider {
        fn len(&self) -> u64 {
            0
        }

        fn read_at(&self, _pos: u64, _buf: &mut [u8]) -> Result<ReadChunk, StreamError> {
            Err(StreamError::EndOfStream)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_hooks_run_in_order_at_last_drop() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = Arc::clone(&order);
        let o2 = Arc::clone(&order);
        let block = ControlBlock::new(
            Box::new(NullProvider),
            Some(Box::new(move || o1.lock().unwrap().push("payload"))),
            Some(Box::new(move || o2.lock().unwrap().push("control"))),
        );

        let second = Arc::clone(&block);
        drop(block);
        assert!(order.lock().unwrap().is_empty());

        drop(second);
        assert_eq!(*order.lock().unwrap(), vec!["payload", "control"]);
    }

    #[test]
    fn test_missing_hooks_are_fine() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Counting;
        impl Provider for Counting {
            fn len(&self) -> u64 {
                0
            }
            fn read_at(&self, _: u64, _: &mut [u8]) -> Result<ReadChunk, StreamError> {
                Err(StreamError::EndOfStream)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        impl Drop for Counting {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        drop(ControlBlock::new(Box::new(Counting), None, None));
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
    }
}
