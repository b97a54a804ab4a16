//! Debug assertion macros for the transport layer's internal invariants.
//!
//! Only active in debug builds (`#[cfg(debug_assertions)]`) — zero overhead
//! in release builds. Shared by `VLRing` and `MPSCSeg`.

/// Assert that a cursor difference (items/bytes in flight) never exceeds capacity.
///
/// Used in: `VLRing` reservation commit, after computing the new write cursor.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded-count violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

/// Assert that a read cursor never advances past the write cursor.
macro_rules! debug_assert_read_not_past_write {
    ($new_read:expr, $write:expr) => {
        debug_assert!(
            $new_read <= $write,
            "read cursor {} advanced past write cursor {}",
            $new_read,
            $write
        )
    };
}

/// Assert that a sequence/cursor value only increases (mod wraparound detection).
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Assert a byte offset/length is 8-byte aligned, as the framed wire format requires.
macro_rules! debug_assert_frame_aligned {
    ($value:expr) => {
        debug_assert!(
            $value % 8 == 0,
            "frame offset/length {} is not 8-byte aligned",
            $value
        )
    };
}

/// Assert a slot is not read before its ready flag has been observed set.
///
/// Used in: `MPSCSeg`'s consumer, immediately before reading a claimed slot.
macro_rules! debug_assert_slot_ready {
    ($ready:expr) => {
        debug_assert!($ready, "read of an MPSCSeg slot before its ready flag was observed")
    };
}

/// Assert that a producer epoch never regresses once pinned.
///
/// Used in: `MPSCSeg`'s enqueue path, around the claim step.
macro_rules! debug_assert_epoch_monotonic {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "producer epoch regressed from {} to {}",
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_epoch_monotonic;
pub(crate) use debug_assert_frame_aligned;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_read_not_past_write;
pub(crate) use debug_assert_slot_ready;
