use crate::cache::CacheAligned;
use crate::config::TransportConfig;
use crate::error::RingError;
use crate::framed::{FrameHeader, HEADER_LEN, KIND_PADDING};
use crate::invariants::{debug_assert_bounded_count, debug_assert_frame_aligned, debug_assert_monotonic};
use crate::metrics::{Metrics, MetricsSnapshot};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// VLRing carries variable-length framed messages over a fixed byte buffer
// between exactly one producer and one consumer. It borrows the unbounded
// u64-cursor trick from a typed SPSC ring: `write_pos`/`read_pos` are
// monotonically increasing byte offsets, never reset or wrapped — only
// `& mask` when indexing into the physical buffer. This sidesteps the ABA
// concerns a wrapping index would otherwise raise, and lets the capacity
// check for both the contiguous and wrap-around placement collapse into a
// single comparison: `capacity - (write - read) >= bytes_needed`, where
// `bytes_needed` already includes any padding frame's length.
//
// **Producer (write path):**
// 1. Load `write_pos` (only the producer writes it; Relaxed is sufficient).
// 2. Consult `cached_read` (`UnsafeCell`, producer-only) for available space.
// 3. If insufficient: Acquire-load `read_pos`, refresh the cache.
// 4. Write header(s) + body into the buffer (no ordering needed).
// 5. Release-store `write_pos`, publishing the frame(s) to the consumer.
//
// **Consumer (read path):**
// 1. Load `read_pos` (only the consumer writes it; Relaxed is sufficient).
// 2. Consult `cached_write` (`UnsafeCell`, consumer-only).
// 3. If empty: Acquire-load `write_pos`, refresh the cache.
// 4. Read the header and body (no ordering needed — already synchronized).
// 5. Release-store `read_pos`, publishing the freed space to the producer.
//
// =============================================================================

/// Single-producer single-consumer, zero-copy, variable-length byte ring.
///
/// Carries framed messages (see [`crate::framed`]) between one producer
/// thread and one consumer thread with no allocation on the hot path.
#[repr(C)]
pub struct VLRing {
    write_pos: CacheAligned<AtomicU64>,
    cached_read: CacheAligned<UnsafeCell<u64>>,

    read_pos: CacheAligned<AtomicU64>,
    cached_write: CacheAligned<UnsafeCell<u64>>,

    closed: AtomicBool,
    metrics: Metrics,
    capacity: usize,

    buffer: UnsafeCell<Box<[u8]>>,
}

// Safety: the buffer is partitioned by the write_pos/read_pos protocol —
// the producer only touches bytes in [write_pos, write_pos+capacity) it has
// not yet published, the consumer only touches bytes it has observed
// published and not yet freed. No two threads touch the same byte at once.
unsafe impl Send for VLRing {}
unsafe impl Sync for VLRing {}

impl VLRing {
    /// Creates a new ring with the configured capacity.
    ///
    /// # Panics
    /// Panics if the configured capacity is not a multiple of 8 — every
    /// frame (including padding) advances the cursors by a multiple of 8,
    /// so a non-aligned capacity could leave a less-than-header-sized gap
    /// at the physical end of the buffer that no padding frame could cover.
    pub fn new(config: TransportConfig) -> Self {
        let capacity = config.ring_capacity();
        assert!(capacity % 8 == 0, "VLRing capacity must be a multiple of 8 bytes");
        assert!(capacity >= HEADER_LEN * 2, "VLRing capacity too small to hold any frame");

        let buffer = vec![0u8; capacity].into_boxed_slice();

        Self {
            write_pos: CacheAligned::new(AtomicU64::new(0)),
            cached_read: CacheAligned::new(UnsafeCell::new(0)),
            read_pos: CacheAligned::new(AtomicU64::new(0)),
            cached_write: CacheAligned::new(UnsafeCell::new(0)),
            closed: AtomicBool::new(false),
            metrics: Metrics::new(),
            capacity,
            buffer: UnsafeCell::new(buffer),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn mask(&self) -> u64 {
        (self.capacity - 1) as u64
    }

    /// Bytes currently published but not yet read.
    #[inline]
    pub fn len(&self) -> usize {
        let w = self.write_pos.load(Ordering::Relaxed);
        let r = self.read_pos.load(Ordering::Relaxed);
        w.wrapping_sub(r) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_pos.load(Ordering::Relaxed) == self.read_pos.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // -------------------------------------------------------------------
    // PRODUCER API
    // -------------------------------------------------------------------

    /// Reserves space for a frame of `body_len` bytes carrying `kind`/
    /// `count`, writing the header(s) immediately. The caller fills the
    /// returned body slice and calls [`VLRingWriteGuard::commit`] to
    /// publish it to the consumer.
    ///
    /// `body_len` must be a multiple of 8: the wire format's `length` field
    /// (§6) carries only the 8-byte-aligned total frame size, with no
    /// separate field for an unpadded body length, so a non-aligned body
    /// would resurface trailing padding bytes to the consumer's handler on
    /// read. Callers with a body that isn't naturally a multiple of 8 must
    /// pad it themselves before reserving.
    pub fn begin_write(&self, kind: u16, count: u16, body_len: usize) -> Result<VLRingWriteGuard<'_>, RingError> {
        debug_assert!(kind != KIND_PADDING, "application frames must not use the padding kind");

        if body_len % 8 != 0 {
            return Err(RingError::UnalignedBody { body_len });
        }

        let total = HEADER_LEN + body_len;
        if total > self.capacity {
            return Err(RingError::QueueFull { requested: total });
        }

        let cap = self.capacity as u64;
        let w = self.write_pos.load(Ordering::Relaxed);
        let widx = (w & self.mask()) as usize;

        let (pad, frame_offset, needed) = if widx + total <= self.capacity {
            (None, widx, total as u64)
        } else {
            let pad_len = self.capacity - widx;
            (Some((widx, pad_len)), 0usize, (total + pad_len) as u64)
        };

        // Fast path: cached read position.
        // SAFETY: cached_read is written only by the producer (this path).
        let cached_read = unsafe { *self.cached_read.get() };
        let mut space = cap.saturating_sub(w.wrapping_sub(cached_read));

        if space < needed {
            // Slow path: refresh from the consumer's published cursor.
            let fresh = self.read_pos.load(Ordering::Acquire);
            // SAFETY: cached_read is written only by the producer (this path).
            unsafe { *self.cached_read.get() = fresh };
            space = cap.saturating_sub(w.wrapping_sub(fresh));
            if space < needed {
                return Err(RingError::QueueFull { requested: total });
            }
        }

        // SAFETY: [widx, widx+pad) and [frame_offset, frame_offset+HEADER_LEN)
        // fall strictly within the bytes we just proved are unread (`needed`
        // bytes of free space starting at the current write cursor), and no
        // other thread writes to this region until `write_pos` advances.
        let buf = unsafe { &mut *self.buffer.get() };
        if let Some((pad_offset, pad_len)) = pad {
            debug_assert_frame_aligned!(pad_len);
            FrameHeader::padding(pad_len as u32).write_to(&mut buf[pad_offset..pad_offset + HEADER_LEN]);
        }
        FrameHeader::new(total as u32, kind, count).write_to(&mut buf[frame_offset..frame_offset + HEADER_LEN]);

        let body_start = frame_offset + HEADER_LEN;
        let body = &mut buf[body_start..body_start + body_len];

        Ok(VLRingWriteGuard {
            ring: self,
            body,
            new_write_pos: w.wrapping_add(needed),
        })
    }

    fn commit_internal(&self, new_write_pos: u64) {
        let w = self.write_pos.load(Ordering::Relaxed);
        debug_assert_monotonic!("write_pos", w, new_write_pos);
        let r = self.read_pos.load(Ordering::Relaxed);
        debug_assert_bounded_count!(new_write_pos.wrapping_sub(r) as usize, self.capacity);

        self.write_pos.store(new_write_pos, Ordering::Release);

        self.metrics.add_messages_sent(1);
        self.metrics.add_batches_sent(1);
    }

    // -------------------------------------------------------------------
    // CONSUMER API
    // -------------------------------------------------------------------

    /// Reads and processes exactly one application frame (padding frames
    /// are consumed transparently and do not count). Returns `false` if no
    /// full frame is currently available.
    pub fn read_one<F>(&self, mut handler: F) -> bool
    where
        F: FnMut(u16, u16, &[u8]),
    {
        loop {
            let r = self.read_pos.load(Ordering::Relaxed);

            // Fast path: cached write position.
            // SAFETY: cached_write is written only by the consumer (this path).
            let mut w = unsafe { *self.cached_write.get() };
            if r == w {
                w = self.write_pos.load(Ordering::Acquire);
                // SAFETY: cached_write is written only by the consumer (this path).
                unsafe { *self.cached_write.get() = w };
                if r == w {
                    return false;
                }
            }

            let ridx = (r & self.mask()) as usize;
            // SAFETY: bytes in [read_pos, write_pos) were published by the
            // producer via its Release store to write_pos, observed here via
            // the Acquire load above (or a prior one); only the consumer
            // reads this region until read_pos advances past it.
            let buf = unsafe { &*self.buffer.get() };
            let hdr = FrameHeader::read_from(&buf[ridx..ridx + HEADER_LEN]);
            debug_assert_frame_aligned!(hdr.length);

            let new_read = r.wrapping_add(u64::from(hdr.length));

            if hdr.is_padding() {
                self.read_pos.store(new_read, Ordering::Release);
                continue;
            }

            let body_start = ridx + HEADER_LEN;
            let body_len = hdr.length as usize - HEADER_LEN;
            let body = &buf[body_start..body_start + body_len];
            handler(hdr.kind, hdr.count, body);

            self.read_pos.store(new_read, Ordering::Release);
            self.metrics.add_messages_received(1);
            self.metrics.add_batches_received(1);
            return true;
        }
    }

    /// Reads and processes all currently available application frames.
    /// Returns the number processed.
    pub fn read_all<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(u16, u16, &[u8]),
    {
        let mut count = 0;
        while self.read_one(&mut handler) {
            count += 1;
        }
        count
    }

    /// Convenience wrapper around [`VLRing::begin_write`] for a frame with
    /// no entry count (e.g. a single trade or book-ticker), copying `body`
    /// in and committing in one call.
    pub fn write_frame(&self, kind: u16, body: &[u8]) -> Result<(), RingError> {
        self.write_var_frame(kind, 0, body)
    }

    /// Convenience wrapper around [`VLRing::begin_write`] for a frame whose
    /// body holds `count` variable-length entries (e.g. depth-update price
    /// levels), copying `body` in and committing in one call.
    pub fn write_var_frame(&self, kind: u16, count: u16, body: &[u8]) -> Result<(), RingError> {
        let mut guard = self.begin_write(kind, count, body.len())?;
        guard.body_mut().copy_from_slice(body);
        guard.commit();
        Ok(())
    }
}

/// A reserved, not-yet-published frame slot returned by [`VLRing::begin_write`].
pub struct VLRingWriteGuard<'a> {
    ring: &'a VLRing,
    body: &'a mut [u8],
    new_write_pos: u64,
}

impl<'a> VLRingWriteGuard<'a> {
    /// The writable body region for this frame.
    #[inline]
    pub fn body_mut(&mut self) -> &mut [u8] {
        self.body
    }

    /// Publishes this frame (and any preceding padding frame) to the consumer.
    #[inline]
    pub fn commit(self) {
        self.ring.commit_internal(self.new_write_pos);
    }
}
