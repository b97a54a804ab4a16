//! `AsyncLogger`: many producer threads enqueue structured records without
//! blocking on I/O; one dedicated consumer thread formats and fans them out
//! to sinks.

use crate::format;
use crate::record::{LogLevel, LogRecord, SourceLocation};
use crate::sink::LogSink;
use hft_transport::{MPSCSeg, Producer, TransportConfig};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Sizing/filtering configuration for an [`AsyncLogger`].
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub level: LogLevel,
    /// Forwarded to the underlying `MPSCSeg<LogRecord>`.
    pub transport: TransportConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            transport: TransportConfig::new(12, 256, 64, false),
        }
    }
}

/// A counting semaphore built from `Mutex`+`Condvar`, the direct idiomatic
/// translation of the original's `std::counting_semaphore` — no crate in
/// the corpus provides one, and this is the std-native equivalent.
struct Semaphore {
    count: Mutex<u64>,
    condvar: Condvar,
}

impl Semaphore {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    fn release(&self) {
        let mut count = self.count.lock().unwrap();
        *count += 1;
        self.condvar.notify_one();
    }

    fn acquire(&self) {
        let mut count = self.count.lock().unwrap();
        while *count == 0 {
            count = self.condvar.wait(count).unwrap();
        }
        *count -= 1;
    }
}

struct Inner {
    level: AtomicU8,
    queue: MPSCSeg<LogRecord>,
    semaphore: Semaphore,
    stop: std::sync::atomic::AtomicBool,
    dropped_records: AtomicUsize,
}

/// Producer-side handle shared by application threads. Non-owning: drops
/// leave the logger's consumer and sinks alone.
///
/// Many `LoggerHandle`s can exist concurrently; each registers its own
/// `hft_transport::Producer` on construction.
pub struct LoggerHandle {
    inner: Arc<Inner>,
    producer: Producer<LogRecord>,
}

impl LoggerHandle {
    /// Logs one record if `level` passes the configured filter. The level
    /// check happens before any allocation or enqueue, so a filtered-out
    /// call costs one atomic load.
    pub fn log(&self, level: LogLevel, location: SourceLocation, text: impl Into<String>) {
        if (level as u8) < self.inner.level.load(Ordering::Relaxed) {
            return;
        }
        let record = LogRecord::new(level, location, text.into());
        if self.producer.enqueue(record).is_err() {
            // Queue closed underneath us (logger shutting down); count it
            // rather than panicking a caller that is merely trying to log.
            self.inner.dropped_records.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.inner.semaphore.release();
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.level.store(level as u8, Ordering::Relaxed);
    }
}

/// Convenience macro mirroring the original's `LOG_INFO`/`LOG_DEBUG`/
/// `LOG_ERROR` call-site macros, capturing file/line/function automatically.
#[macro_export]
macro_rules! log {
    ($handle:expr, $level:expr, $text:expr) => {
        $handle.log($level, $crate::source_location!(), $text)
    };
}

/// Owns the logger's consumer thread and sink list. Construct one
/// `AsyncLogger`, then call [`AsyncLogger::handle`] for each producer
/// thread — this replaces the original's `Logger::instance()` process-wide
/// singleton with an explicitly constructed, shareable object.
pub struct AsyncLogger {
    inner: Arc<Inner>,
    consumer: Option<JoinHandle<Vec<Box<dyn LogSink>>>>,
}

impl AsyncLogger {
    /// Spawns the consumer thread, which owns `sinks` for the logger's
    /// lifetime (and hands them back once `shutdown` joins the thread).
    pub fn new(config: LoggerConfig, sinks: Vec<Box<dyn LogSink>>) -> Self {
        let inner = Arc::new(Inner {
            level: AtomicU8::new(config.level as u8),
            queue: MPSCSeg::new(config.transport),
            semaphore: Semaphore::new(),
            stop: std::sync::atomic::AtomicBool::new(false),
            dropped_records: AtomicUsize::new(0),
        });

        let consumer_inner = Arc::clone(&inner);
        let consumer = std::thread::Builder::new()
            .name("async-logger-consumer".to_owned())
            .spawn(move || Self::process(&consumer_inner, sinks))
            .expect("failed to spawn logger consumer thread");

        Self {
            inner,
            consumer: Some(consumer),
        }
    }

    /// Registers a new producer and returns its handle.
    ///
    /// # Panics
    /// Panics if the configured `max_producers` has been exhausted — the
    /// logger's producer population is expected to be set up once at
    /// startup, not grown dynamically per request.
    pub fn handle(&self) -> LoggerHandle {
        let producer = self.inner.queue.register().expect("logger producer registry exhausted");
        LoggerHandle {
            inner: Arc::clone(&self.inner),
            producer,
        }
    }

    pub fn dropped_records(&self) -> usize {
        self.inner.dropped_records.load(Ordering::Relaxed)
    }

    fn process(inner: &Arc<Inner>, mut sinks: Vec<Box<dyn LogSink>>) -> Vec<Box<dyn LogSink>> {
        loop {
            inner.semaphore.acquire();

            if inner.stop.load(Ordering::Acquire) && inner.queue.is_empty() {
                break;
            }

            while let Some(record) = inner.queue.try_dequeue() {
                let line = format::format(&record);
                for sink in &mut sinks {
                    // Best-effort: a sink failing does not stop the others
                    // or the consumer loop (SinkIO is logged-best-effort
                    // per the error-handling design).
                    let _ = sink.write(&line);
                }
            }
        }
        sinks
    }

    /// Signals shutdown and blocks until the consumer has drained every
    /// record enqueued before this call and exited. Returns the sinks so
    /// the caller can flush/close them explicitly if needed.
    pub fn shutdown(mut self) -> Vec<Box<dyn LogSink>> {
        self.inner.stop.store(true, Ordering::Release);
        self.inner.semaphore.release();
        self.inner.queue.close();
        self.consumer
            .take()
            .map(|h| h.join().expect("logger consumer thread panicked"))
            .unwrap_or_default()
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        if let Some(consumer) = self.consumer.take() {
            self.inner.stop.store(true, Ordering::Release);
            self.inner.semaphore.release();
            self.inner.queue.close();
            let _ = consumer.join();
        }
    }
}
