//! The record a producer hands to the logger and the consumer formats.

use std::thread::ThreadId;

/// Severity, ordered so `level as u8` comparisons implement the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The call-site location a record was emitted from.
#[derive(Debug, Clone, Copy)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub func: &'static str,
}

/// One structured log entry, handed from a producer thread to the logger's
/// consumer thread via `MPSCSeg<LogRecord>`.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub thread_id: ThreadId,
    pub location: SourceLocation,
    pub text: String,
    /// Milliseconds since the Unix epoch, captured at the call site so the
    /// consumer's formatting delay doesn't skew the timestamp.
    pub timestamp_millis: i64,
}

/// Captures `std::thread::current().id()` and the current wall-clock time,
/// pairing them with the caller-supplied level/location/text.
impl LogRecord {
    pub fn new(level: LogLevel, location: SourceLocation, text: String) -> Self {
        Self {
            level,
            thread_id: std::thread::current().id(),
            location,
            text,
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Captures `file!()`, `line!()`, and the enclosing function name at the
/// call site, matching the original's `__FILE__`/`__LINE__`/`__func__`
/// macro trio.
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation {
            file: file!(),
            line: line!(),
            func: {
                fn f() {}
                fn type_name_of<T>(_: T) -> &'static str {
                    std::any::type_name::<T>()
                }
                let name = type_name_of(f);
                &name[..name.len() - 3]
            },
        }
    };
}
