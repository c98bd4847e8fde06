//! Per-control-block operation counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by every handle on one control block.
///
/// All updates use `Relaxed` ordering: the counters are monitoring data and
/// carry no synchronization duty.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    reads: AtomicU64,
    bytes_read: AtomicU64,
    clones: AtomicU64,
    releases: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_clone(&self) {
        self.clones.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            clones: self.clones.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters on a control block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Successful read calls across all handles.
    pub reads: u64,
    /// Bytes written into consumer buffers across all handles.
    pub bytes_read: u64,
    /// Handles created by cloning (the factory handle is not counted).
    pub clones: u64,
    /// Successful release calls across all handles.
    pub releases: u64,
}
