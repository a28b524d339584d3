//! Tee logger: console plus an optional log file
//!
//! Training scripts want their console output preserved next to checkpoints.
//! [`Logger`] duplicates every write to stdout and, when configured, a log
//! file, and guarantees the file is released exactly once however the scope
//! unwinds.

use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::Path;

/// How to open the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Start the file fresh, discarding previous contents.
    Truncate,
    /// Keep previous contents and append.
    Append,
}

/// Duplicates text output to stdout and, when configured, a log file.
///
/// `close` is idempotent: both `Drop` and explicit shutdown may call it, and
/// the second call is a no-op.
#[derive(Debug)]
pub struct Logger {
    console: Stdout,
    file: Option<File>,
    closed: bool,
}

impl Logger {
    /// Console-only logger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            console: io::stdout(),
            file: None,
            closed: false,
        }
    }

    /// Logger that also duplicates output into the file at `path`.
    pub fn with_file(path: impl AsRef<Path>, mode: LogMode) -> io::Result<Self> {
        let file = match mode {
            LogMode::Truncate => File::create(path)?,
            LogMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        Ok(Self {
            console: io::stdout(),
            file: Some(file),
            closed: false,
        })
    }

    /// Write a message to both sinks.
    pub fn write_msg(&mut self, msg: &str) -> io::Result<()> {
        self.write_all(msg.as_bytes())
    }

    /// Flush both sinks and force file contents to stable storage.
    pub fn flush_all(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Some(file) = &mut self.file {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Flush and release the log file. Safe to call more than once.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.console.flush()?;
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.console.write(buf)?;
        if let Some(file) = &mut self.file {
            file.write_all(&buf[..written])?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_all()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
