/// Sizing configuration shared by `VLRing` and `MPSCSeg`.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// `VLRing` capacity as a power of two, in bytes (default: 16 = 64 KiB).
    pub ring_bits: u8,
    /// Number of slots per `MPSCSeg` chunk.
    pub chunk_size: usize,
    /// Maximum number of producers an `MPSCSeg`/logger registry will accept.
    pub max_producers: usize,
    /// Enable metrics collection (slight overhead).
    pub enable_metrics: bool,
}

impl TransportConfig {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `ring_bits` is 0 or greater than 26 (64 MiB max, to catch
    /// accidental misconfiguration), if `chunk_size` is 0, or if
    /// `max_producers` is 0 or greater than 1024.
    pub const fn new(ring_bits: u8, chunk_size: usize, max_producers: usize, enable_metrics: bool) -> Self {
        assert!(ring_bits > 0 && ring_bits <= 26, "ring_bits must be between 1 and 26 (max 64 MiB)");
        assert!(chunk_size > 0, "chunk_size must be non-zero");
        assert!(max_producers > 0 && max_producers <= 1024, "max_producers must be between 1 and 1024");

        Self {
            ring_bits,
            chunk_size,
            max_producers,
            enable_metrics,
        }
    }

    /// Returns the capacity of the `VLRing` buffer, in bytes.
    #[inline]
    pub const fn ring_capacity(&self) -> usize {
        1 << self.ring_bits
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ring_bits: 16, // 64 KiB
            chunk_size: 1024,
            max_producers: 64,
            enable_metrics: false,
        }
    }
}

/// Low-latency preset: small ring (4 KiB, fits in L1), small chunks so a
/// slow producer cannot pin a large chunk open for long.
pub const LOW_LATENCY_CONFIG: TransportConfig = TransportConfig::new(12, 64, 64, false);

/// Market-data-ingest preset: a ring large enough to absorb depth-stream
/// bursts without backpressure, and larger MPSCSeg chunks to amortize CAS
/// chunk installs under heavy log/event volume.
pub const MARKET_DATA_CONFIG: TransportConfig = TransportConfig::new(20, 4096, 128, true);
