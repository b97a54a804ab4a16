//! Output destinations for formatted log lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by a [`LogSink`]'s `write`/rotate operations.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A destination for formatted log lines. Implementations must not block
/// the consumer thread for long — a slow sink stalls every producer once
/// the queue backs up behind it.
pub trait LogSink: Send {
    fn write(&mut self, formatted: &str) -> Result<(), SinkError>;
}

/// Writes each line to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&mut self, formatted: &str) -> Result<(), SinkError> {
        println!("{formatted}");
        Ok(())
    }
}

/// Writes each line to a file, rotating to `<name>.1` once the file exceeds
/// `max_size` bytes. Only one backup slot is kept — a second rotation
/// overwrites the first.
pub struct RotatingFileSink {
    path: PathBuf,
    max_size: u64,
    file: File,
    size: u64,
}

impl RotatingFileSink {
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> Result<Self, SinkError> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self { path, max_size, file, size })
    }

    fn rotate(&mut self) -> Result<(), SinkError> {
        let backup = backup_path(&self.path);
        let _ = std::fs::remove_file(&backup);
        std::fs::rename(&self.path, &backup)?;
        self.file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".1");
    PathBuf::from(backup)
}

impl LogSink for RotatingFileSink {
    fn write(&mut self, formatted: &str) -> Result<(), SinkError> {
        writeln!(self.file, "{formatted}")?;
        self.size += formatted.len() as u64 + 1;
        if self.size > self.max_size {
            self.rotate()?;
        }
        Ok(())
    }
}
