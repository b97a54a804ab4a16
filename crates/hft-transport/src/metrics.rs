use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe throughput counters for a `VLRing` or `MPSCSeg`.
///
/// All updates use `Relaxed` ordering: these are purely statistical
/// counters consumed by operators/dashboards, not used for synchronization
/// between producer and consumer, so there is nothing to order them
/// against.
#[derive(Debug, Default)]
pub struct Metrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    batches_sent: AtomicU64,
    batches_received: AtomicU64,
    reserve_spins: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_messages_sent(&self, n: u64) {
        self.messages_sent.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_messages_received(&self, n: u64) {
        self.messages_received.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_batches_sent(&self, n: u64) {
        self.batches_sent.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_batches_received(&self, n: u64) {
        self.batches_received.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_reserve_spins(&self, n: u64) {
        self.reserve_spins.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_received: self.batches_received.load(Ordering::Relaxed),
            reserve_spins: self.reserve_spins.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a `Metrics` counter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub batches_sent: u64,
    pub batches_received: u64,
    pub reserve_spins: u64,
}
