//! Debug assertion macros for stream window invariants.
//!
//! These are only active in debug builds (`debug_assert!`), so there is zero
//! overhead in release builds. Used by `ByteStream` and the composite
//! provider.

// =============================================================================
// Window ordering
// =============================================================================

/// Assert the three cursor fields of a stream window stay ordered.
///
/// **Invariant**: `first_valid ≤ current ≤ length`
///
/// Used after every cursor mutation.
macro_rules! debug_assert_window_ordered {
    ($first_valid:expr, $current:expr, $length:expr) => {
        debug_assert!(
            $first_valid <= $current && $current <= $length,
            "window ordering violated: first_valid {} / current {} / length {}",
            $first_valid,
            $current,
            $length
        )
    };
}

// =============================================================================
// Read consumption bound
// =============================================================================

/// Assert a provider did not consume more source bytes than remain.
///
/// **Invariant**: `consumed ≤ length - current`
///
/// Used in `ByteStream::read()` after the provider returns.
macro_rules! debug_assert_consumed_bounded {
    ($consumed:expr, $remaining:expr) => {
        debug_assert!(
            $consumed <= $remaining,
            "provider consumed {} source bytes with only {} remaining",
            $consumed,
            $remaining
        )
    };
}

// =============================================================================
// Composite boundary
// =============================================================================

/// Assert a delegated position falls inside the composite's content.
///
/// **Invariant**: delegated reads only target `[0, length)`
///
/// Used in the composite provider before selecting a child.
macro_rules! debug_assert_within_content {
    ($pos:expr, $length:expr) => {
        debug_assert!(
            $pos < $length,
            "delegated position {} outside content of length {}",
            $pos,
            $length
        )
    };
}

pub(crate) use debug_assert_consumed_bounded;
pub(crate) use debug_assert_window_ordered;
pub(crate) use debug_assert_within_content;
