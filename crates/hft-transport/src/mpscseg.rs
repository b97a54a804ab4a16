use crate::config::TransportConfig;
use crate::error::SegError;
use crate::invariants::{debug_assert_epoch_monotonic, debug_assert_slot_ready};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// DESIGN
// =============================================================================
//
// MPSCSeg is a chunked singly-linked list. Producers claim a slot within the
// current tail chunk via `fetch_add` on that chunk's `filled` counter; once a
// chunk is exhausted, producers race to CAS-install a freshly allocated
// successor chunk and cooperatively advance `tail` to it.
//
// The claim counter is deliberately NOT the consumer's readiness signal —
// a producer that has claimed slot `i` may not have finished writing to it
// yet. Each slot carries its own `ready: AtomicBool`, stored with Release
// after the value is written and loaded with Acquire by the consumer before
// it will read that slot. The consumer stalls at an unready slot rather
// than skipping it, preserving per-producer program order.
//
// Reclaiming a chunk once the consumer has advanced past it is unsound to
// do eagerly: a producer may have loaded the old `tail` pointer and still be
// mid-claim on it when the consumer retires it. Each producer "pins" itself
// to the current global epoch for the duration of its enqueue call; a
// retired chunk is only freed once every producer's pinned epoch is either
// absent (unpinned) or strictly newer than the epoch at which the chunk was
// retired — proof that no producer could still hold a reference predating
// the retirement.
//
// =============================================================================

const UNPINNED: u64 = u64::MAX;

struct Chunk<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    ready: Box<[AtomicBool]>,
    filled: AtomicUsize,
    next: AtomicPtr<Chunk<T>>,
}

impl<T> Chunk<T> {
    fn new(chunk_size: usize) -> Self {
        let mut slots = Vec::with_capacity(chunk_size);
        slots.resize_with(chunk_size, || UnsafeCell::new(MaybeUninit::uninit()));
        let mut ready = Vec::with_capacity(chunk_size);
        ready.resize_with(chunk_size, || AtomicBool::new(false));

        Self {
            slots: slots.into_boxed_slice(),
            ready: ready.into_boxed_slice(),
            filled: AtomicUsize::new(0),
            next: AtomicPtr::new(ptr::null_mut()),
        }
    }
}

struct SegInner<T> {
    tail: AtomicPtr<Chunk<T>>,
    head: UnsafeCell<*mut Chunk<T>>,
    head_index: UnsafeCell<usize>,
    garbage: UnsafeCell<Vec<(*mut Chunk<T>, u64)>>,
    global_epoch: AtomicU64,
    producer_epochs: Box<[AtomicU64]>,
    chunk_size: usize,
    max_producers: usize,
    producer_count: AtomicUsize,
    closed: AtomicBool,
}

// Safety: all cross-thread access to the shared chunk chain goes through the
// claim counter / ready-flag / epoch protocol described above; `head` and
// `head_index` are touched only by the single consumer.
unsafe impl<T: Send> Send for SegInner<T> {}
unsafe impl<T: Send> Sync for SegInner<T> {}

/// Unbounded, lock-free, multi-producer single-consumer queue.
///
/// Many [`Producer`] handles may call [`Producer::enqueue`] concurrently.
/// Exactly one thread is expected to call [`MPSCSeg::try_dequeue`].
pub struct MPSCSeg<T> {
    inner: Arc<SegInner<T>>,
}

impl<T: Send> MPSCSeg<T> {
    pub fn new(config: TransportConfig) -> Self {
        let first_chunk = Box::into_raw(Box::new(Chunk::new(config.chunk_size)));
        let producer_epochs = (0..config.max_producers)
            .map(|_| AtomicU64::new(UNPINNED))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            inner: Arc::new(SegInner {
                tail: AtomicPtr::new(first_chunk),
                head: UnsafeCell::new(first_chunk),
                head_index: UnsafeCell::new(0),
                garbage: UnsafeCell::new(Vec::new()),
                global_epoch: AtomicU64::new(0),
                producer_epochs,
                chunk_size: config.chunk_size,
                max_producers: config.max_producers,
                producer_count: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers a new producer. Errors if the queue is closed or the
    /// configured `max_producers` has been reached.
    pub fn register(&self) -> Result<Producer<T>, SegError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(SegError::Closed);
        }

        let id = self.inner.producer_count.fetch_add(1, Ordering::SeqCst);
        if id >= self.inner.max_producers {
            self.inner.producer_count.fetch_sub(1, Ordering::SeqCst);
            return Err(SegError::TooManyProducers {
                max: self.inner.max_producers,
            });
        }

        Ok(Producer {
            inner: Arc::clone(&self.inner),
            id,
        })
    }

    /// Pulls the next published value, in the order its producer committed
    /// it. Must only be called from a single, consistent consumer thread.
    pub fn try_dequeue(&self) -> Option<T> {
        self.inner.try_dequeue()
    }

    /// Advisory emptiness check: may race with concurrent producers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    pub fn producer_count(&self) -> usize {
        self.inner.producer_count.load(Ordering::Acquire)
    }
}

impl<T: Send> Clone for MPSCSeg<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send> SegInner<T> {
    fn try_dequeue(&self) -> Option<T> {
        loop {
            // SAFETY: head/head_index are only ever touched by the single
            // consumer thread, matching the queue's MPSC contract.
            let head_chunk_ptr = unsafe { *self.head.get() };
            let head_index = unsafe { *self.head_index.get() };
            let chunk = unsafe { &*head_chunk_ptr };

            if head_index < self.chunk_size {
                if !chunk.ready[head_index].load(Ordering::Acquire) {
                    // Claimed but not yet published. Stall here rather than
                    // skip it — preserves this slot's producer's ordering.
                    return None;
                }
                debug_assert_slot_ready!(true);
                // SAFETY: the Acquire load above observed this producer's
                // Release store after it finished writing the slot.
                let value = unsafe { (*chunk.slots[head_index].get()).assume_init_read() };
                unsafe { *self.head_index.get() = head_index + 1 };
                return Some(value);
            }

            let next = chunk.next.load(Ordering::Acquire);
            if next.is_null() {
                return None;
            }

            self.retire_chunk(head_chunk_ptr);
            unsafe {
                *self.head.get() = next;
                *self.head_index.get() = 0;
            }
        }
    }

    fn is_empty(&self) -> bool {
        let head_chunk_ptr = unsafe { *self.head.get() };
        let head_index = unsafe { *self.head_index.get() };
        let chunk = unsafe { &*head_chunk_ptr };
        if head_index < self.chunk_size {
            !chunk.ready[head_index].load(Ordering::Acquire)
        } else {
            chunk.next.load(Ordering::Acquire).is_null()
        }
    }

    fn retire_chunk(&self, chunk_ptr: *mut Chunk<T>) {
        let retired_at = self.global_epoch.fetch_add(1, Ordering::AcqRel);
        debug_assert_epoch_monotonic!(retired_at, retired_at + 1);
        // SAFETY: garbage is only ever touched by the single consumer thread.
        unsafe { (*self.garbage.get()).push((chunk_ptr, retired_at)) };
        self.try_reclaim();
    }

    fn try_reclaim(&self) {
        // SAFETY: garbage is only ever touched by the single consumer thread.
        let garbage = unsafe { &mut *self.garbage.get() };
        garbage.retain(|&(ptr, retired_at)| {
            let safe_to_free = self.producer_epochs.iter().all(|e| {
                let pinned = e.load(Ordering::Acquire);
                pinned == UNPINNED || pinned > retired_at
            });

            if safe_to_free {
                // SAFETY: this chunk was retired only after the consumer
                // fully drained it (head_index reached chunk_size), so it
                // holds no live `T`s; no producer can still be referencing
                // it (proven by the epoch check above).
                drop(unsafe { Box::from_raw(ptr) });
            }
            !safe_to_free
        });
    }
}

impl<T> Drop for SegInner<T> {
    fn drop(&mut self) {
        // Drop any remaining, unconsumed values in the live chain.
        let mut chunk_ptr = *self.head.get_mut();
        let mut index = *self.head_index.get_mut();

        loop {
            // SAFETY: &mut self guarantees exclusive access; no other
            // thread can be operating on this queue during drop.
            let chunk = unsafe { &*chunk_ptr };
            let filled = chunk.filled.load(Ordering::Relaxed).min(self.chunk_size);
            for i in index..filled {
                if chunk.ready[i].load(Ordering::Relaxed) {
                    unsafe { ptr::drop_in_place(chunk.slots[i].get().cast::<T>()) };
                }
            }

            let next = chunk.next.load(Ordering::Relaxed);
            unsafe { drop(Box::from_raw(chunk_ptr)) };
            if next.is_null() {
                break;
            }
            chunk_ptr = next;
            index = 0;
        }

        for (ptr, _) in self.garbage.get_mut().drain(..) {
            unsafe { drop(Box::from_raw(ptr)) };
        }
    }
}

/// A registered producer handle. Intentionally not `Clone` — cloning would
/// let two threads claim slots under the same identity, which is harmless
/// to the queue's correctness (claims are per-chunk, not per-producer) but
/// would defeat the epoch pin this handle performs on its owner's behalf.
pub struct Producer<T: Send> {
    inner: Arc<SegInner<T>>,
    id: usize,
}

impl<T: Send> Producer<T> {
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Enqueues `value`. Always succeeds unless the queue has been closed —
    /// the queue grows new chunks under contention rather than rejecting
    /// writes.
    pub fn enqueue(&self, value: T) -> Result<(), SegError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(SegError::Closed);
        }

        let pin_epoch = self.inner.global_epoch.load(Ordering::Acquire);
        self.inner.producer_epochs[self.id].store(pin_epoch, Ordering::Release);

        let mut value = value;
        loop {
            let tail_ptr = self.inner.tail.load(Ordering::Acquire);
            // SAFETY: tail always points at a live chunk — chunks are only
            // freed once no producer's pinned epoch predates their
            // retirement, and this producer pinned before this load.
            let chunk = unsafe { &*tail_ptr };
            let i = chunk.filled.fetch_add(1, Ordering::Relaxed);

            if i < self.inner.chunk_size {
                // SAFETY: slot `i` was exclusively claimed by this fetch_add;
                // no other producer can claim the same index in this chunk.
                unsafe { (*chunk.slots[i].get()).write(value) };
                chunk.ready[i].store(true, Ordering::Release);
                break;
            }

            value = self.grow_and_retry(tail_ptr, chunk, value);
        }

        self.inner.producer_epochs[self.id].store(UNPINNED, Ordering::Release);
        Ok(())
    }

    fn grow_and_retry(&self, tail_ptr: *mut Chunk<T>, chunk: &Chunk<T>, value: T) -> T {
        let next = chunk.next.load(Ordering::Acquire);
        let next_chunk = if next.is_null() {
            let candidate = Box::into_raw(Box::new(Chunk::new(self.inner.chunk_size)));
            match chunk.next.compare_exchange(
                ptr::null_mut(),
                candidate,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => candidate,
                Err(installed) => {
                    // SAFETY: we exclusively allocated `candidate` and no
                    // other thread observed it (the CAS that would have
                    // published it failed), so it is safe to drop here.
                    drop(unsafe { Box::from_raw(candidate) });
                    installed
                }
            }
        } else {
            next
        };

        // Best-effort: advance tail. A losing producer simply observes the
        // new tail on its next loop iteration via the Acquire load above.
        let _ = self
            .inner
            .tail
            .compare_exchange(tail_ptr, next_chunk, Ordering::Release, Ordering::Relaxed);

        value
    }
}
