//! Lock-free in-process transport layer for an HFT client: the concurrency
//! spine that carries market data and log records between isolated,
//! CPU-pinned threads.
//!
//! - [`VLRing`] — single-producer/single-consumer, zero-copy, variable-length
//!   byte ring carrying [`FrameHeader`]-delimited messages.
//! - [`MPSCSeg`] — unbounded, lock-free, multi-producer/single-consumer
//!   segmented queue for fixed-shape records.
//! - [`depth`] — pure decision functions (and a per-symbol registry) deciding
//!   whether an incoming depth update preserves order-book continuity.
//! - [`SequenceCounter`] — monotone sequence validation for a tag-delimited
//!   message stream (FIX-style).
//! - [`CpuPinnedWorker`] — spawns a thread pinned to a nominated CPU core.
//!
//! # Example
//!
//! ```
//! use hft_transport::{MPSCSeg, TransportConfig};
//!
//! let seg = MPSCSeg::<u64>::new(TransportConfig::default());
//! let producer = seg.register().unwrap();
//! producer.enqueue(42).unwrap();
//! assert_eq!(seg.try_dequeue(), Some(42));
//! ```

mod backoff;
mod cache;
pub mod config;
pub mod depth;
pub mod error;
pub mod framed;
mod invariants;
pub mod metrics;
pub mod mpscseg;
pub mod sequence;
pub mod vlring;
pub mod worker;

pub use backoff::Backoff;
pub use config::{TransportConfig, LOW_LATENCY_CONFIG, MARKET_DATA_CONFIG};
pub use depth::{validate_continuous_depth, validate_first_depth_after_snapshot, DepthBook, DepthDecision, MarketKind};
pub use error::{RingError, SegError, WorkerError};
pub use framed::{FrameHeader, MessageKind, HEADER_LEN, KIND_PADDING};
pub use metrics::{Metrics, MetricsSnapshot};
pub use mpscseg::{MPSCSeg, Producer};
pub use sequence::SequenceCounter;
pub use vlring::{VLRing, VLRingWriteGuard};
pub use worker::CpuPinnedWorker;
