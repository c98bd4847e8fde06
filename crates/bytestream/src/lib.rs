//! bytestream-rs - Immutable, Reference-Counted Byte Stream Views
//!
//! A byte stream abstraction for memory-constrained consumers: producers
//! expose arbitrarily large, possibly non-contiguous or lazily-materialized
//! content behind one iterator-style read interface, and consumers work
//! with small local buffers regardless of where the bytes live (RAM,
//! flash, file, network, generated).
//!
//! # Key Features
//!
//! - Sliding-window cursor model (released / pending / future segments)
//!   with rewind and prefix acknowledgement
//! - Reference-counted content shared by cheap per-consumer clones
//! - O(1) concatenation that never copies the underlying bytes
//! - Open [`Provider`] contract for medium-specific backends
//!
//! # Example
//!
//! ```
//! use bytestream_rs::{concat, flat, StreamError};
//!
//! let a = flat(&b"0123456789"[..]).unwrap();
//! let b = flat(&b"ABCDEFGHIJ"[..]).unwrap();
//!
//! // Compose without copying; both inputs stay usable.
//! let mut m = concat(&a, &b).unwrap();
//! assert_eq!(m.remaining_size(), 20);
//!
//! // Read through a small local buffer.
//! let mut buf = [0u8; 8];
//! let mut total = 0;
//! loop {
//!     match m.read(&mut buf) {
//!         Ok(n) => total += n,
//!         Err(StreamError::EndOfStream) => break,
//!         Err(e) => panic!("read failed: {e}"),
//!     }
//! }
//! assert_eq!(total, 20);
//! ```

mod control;
mod error;
mod flat;
mod invariants;
mod metrics;
mod multi;
mod stream;

pub use control::{Provider, ReadChunk, ReleaseHook};
pub use error::StreamError;
pub use flat::{flat, FlatBuilder, FlatProvider};
pub use metrics::MetricsSnapshot;
pub use multi::{concat, MultiProvider};
pub use stream::ByteStream;
