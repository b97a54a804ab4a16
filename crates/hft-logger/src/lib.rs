//! Async structured logger for an HFT client.
//!
//! Producer threads call [`LoggerHandle::log`], which filters on level and
//! enqueues a [`LogRecord`] onto a lock-free MPSC queue from `hft-transport`.
//! A single dedicated consumer thread formats each record and fans it out to
//! every configured [`LogSink`], so no producer ever blocks on file or
//! console I/O.

mod format;
mod logger;
mod record;
mod sink;

pub use format::format;
pub use logger::{AsyncLogger, LoggerConfig, LoggerHandle};
pub use record::{LogLevel, LogRecord, SourceLocation};
pub use sink::{ConsoleSink, LogSink, RotatingFileSink, SinkError};
