use thiserror::Error;

/// Errors surfaced by `VLRing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// The requested frame does not fit without overwriting unread data.
    #[error("ring has no space for a {requested}-byte frame")]
    QueueFull {
        /// Total aligned frame length that was requested.
        requested: usize,
    },
    /// The requested body length is not a multiple of 8 bytes — the wire
    /// format has no field to recover it from the 8-byte-aligned `length`
    /// on read, so `begin_write` refuses it rather than silently rounding.
    #[error("body length {body_len} is not a multiple of 8 bytes")]
    UnalignedBody {
        /// The unaligned body length that was requested.
        body_len: usize,
    },
}

/// Errors surfaced by `MPSCSeg` producer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SegError {
    /// Too many producers registered (exceeds `max_producers` config).
    #[error("too many producers registered (max: {max})")]
    TooManyProducers {
        /// The configured maximum number of producers.
        max: usize,
    },
    /// Queue is closed.
    #[error("queue is closed")]
    Closed,
}

/// Errors surfaced by `CpuPinnedWorker`.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The OS refused to create the worker thread.
    #[error("failed to create worker thread: {0}")]
    ThreadCreate(std::io::Error),
    /// The requested CPU id could not be pinned (unknown id, or the OS
    /// rejected the affinity call).
    #[error("failed to pin worker to cpu {cpu_id}")]
    Affinity {
        /// The CPU id that could not be set.
        cpu_id: usize,
    },
}
