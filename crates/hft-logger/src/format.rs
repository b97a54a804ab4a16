//! Deterministic, allocation-per-call formatting of a [`crate::LogRecord`].
//!
//! Output shape (bit-exact with the original formatter):
//! `[YYYY-MM-DDTHH:MM:SS.mmm][LEVEL][tid=<id>][file:line][func] <text>`

use crate::record::LogRecord;
use chrono::{TimeZone, Utc};
use std::fmt::Write as _;

/// Formats one record into a single line, ready for a [`crate::LogSink`].
pub fn format(record: &LogRecord) -> String {
    let dt = Utc
        .timestamp_millis_opt(record.timestamp_millis)
        .single()
        .unwrap_or_else(Utc::now);

    let mut out = String::with_capacity(64 + record.text.len());
    let _ = write!(
        out,
        "[{}][{}][tid={:?}][{}:{}][{}] {}",
        dt.format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level,
        record.thread_id,
        record.location.file,
        record.location.line,
        record.location.func,
        record.text,
    );
    out
}
