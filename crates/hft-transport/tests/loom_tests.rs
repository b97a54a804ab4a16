//! Loom-based concurrency tests for the MPSCSeg publication protocol.
//!
//! Run with: `cargo test --features loom --release --test loom_tests`
//!
//! Loom exhaustively explores thread interleavings to catch ordering bugs
//! that only manifest under specific schedules. The full `MPSCSeg<T>` (with
//! its chunk-chain growth and epoch reclamation) is too large a state space
//! for loom to explore in reasonable time, so — matching the teacher's
//! `loom_tests.rs` convention of modelling a simplified version of the real
//! structure — these tests model the single-chunk claim/write/publish/read
//! protocol in isolation: a fixed-size slot array with a claim counter and
//! a per-slot ready flag, exactly the mechanism `MPSCSeg::enqueue`/
//! `try_dequeue` use within one chunk.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;
use std::cell::UnsafeCell;

struct LoomChunk {
    slots: [UnsafeCell<u64>; 2],
    ready: [AtomicBool; 2],
    filled: AtomicUsize,
}

unsafe impl Send for LoomChunk {}
unsafe impl Sync for LoomChunk {}

impl LoomChunk {
    fn new() -> Self {
        Self {
            slots: [UnsafeCell::new(0), UnsafeCell::new(0)],
            ready: [AtomicBool::new(false), AtomicBool::new(false)],
            filled: AtomicUsize::new(0),
        }
    }

    /// Mirrors `Producer::enqueue`'s claim-then-publish sequence for a
    /// single slot within a chunk.
    fn enqueue(&self, value: u64) -> bool {
        let i = self.filled.fetch_add(1, Ordering::Relaxed);
        if i >= self.slots.len() {
            return false;
        }
        // SAFETY: fetch_add uniquely claimed index i.
        unsafe { *self.slots[i].get() = value };
        self.ready[i].store(true, Ordering::Release);
        true
    }

    /// Mirrors `SegInner::try_dequeue`'s ready-flag check for a single slot.
    fn try_read(&self, i: usize) -> Option<u64> {
        if !self.ready[i].load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: the Acquire load observed the producer's Release store,
        // which happened-after its write to the slot.
        Some(unsafe { *self.slots[i].get() })
    }
}

#[test]
fn loom_consumer_never_observes_unpublished_slot() {
    loom::model(|| {
        let chunk = Arc::new(LoomChunk::new());

        let producer = {
            let chunk = Arc::clone(&chunk);
            thread::spawn(move || {
                chunk.enqueue(99);
            })
        };

        // Poll slot 0 the same way the consumer does: a ready read must
        // yield the producer's committed value, never a partial or stale
        // one, on every interleaving loom explores.
        if let Some(value) = chunk.try_read(0) {
            assert_eq!(value, 99);
        }

        producer.join().unwrap();

        // After the producer has joined, the slot must be ready.
        assert_eq!(chunk.try_read(0), Some(99));
    });
}

#[test]
fn loom_two_producers_claim_disjoint_slots() {
    loom::model(|| {
        let chunk = Arc::new(LoomChunk::new());

        let c1 = Arc::clone(&chunk);
        let t1 = thread::spawn(move || c1.enqueue(1));
        let c2 = Arc::clone(&chunk);
        let t2 = thread::spawn(move || c2.enqueue(2));

        let r1 = t1.join().unwrap();
        let r2 = t2.join().unwrap();
        assert!(r1 && r2, "both producers had a free slot in a 2-slot chunk");

        let v0 = chunk.try_read(0);
        let v1 = chunk.try_read(1);
        let mut values: Vec<u64> = [v0, v1].into_iter().flatten().collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);
    });
}
