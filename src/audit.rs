//! Append-only audit log.
//!
//! Every order attempt and its outcome is appended as one line:
//!
//! ```text
//! 2026-10-19 14:03:27,512 - INFO - Attempting to place BUY LIMIT order for 0.01 BTCUSDT
//! ```
//!
//! The log is opened once at startup, handed to the order adapter, and
//! flushed when closed or dropped. Entries are mirrored to `tracing` at debug
//! level under the `audit` target.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::Level;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Line-oriented audit sink.
pub struct AuditLog {
    writer: Mutex<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").field("path", &self.path).finish()
    }
}

impl AuditLog {
    /// Open (or create) the log file in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file: File = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(Box::new(LineWriter::new(file))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Log into an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            path: None,
        }
    }

    /// Log that discards every entry.
    pub fn disabled() -> Self {
        Self::from_writer(io::sink())
    }

    /// File backing this log, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an INFO entry.
    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::INFO, message.as_ref());
    }

    /// Append a WARNING entry.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(Level::WARN, message.as_ref());
    }

    /// Append an ERROR entry.
    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::ERROR, message.as_ref());
    }

    /// Append one entry.
    ///
    /// Write failures are reported through `tracing` and otherwise ignored;
    /// losing an audit line must not abort an order.
    pub fn record(&self, level: Level, message: &str) {
        tracing::debug!(target: "audit", level = level_name(level), "{message}");

        let line = format_line(&Local::now().format(TIMESTAMP_FORMAT).to_string(), level, message);

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            tracing::warn!(error = %e, "Failed to write audit log entry");
        }
    }

    /// Flush and close the log.
    pub fn close(self) -> io::Result<()> {
        // The guard must drop before `self`; a tail `match` would outlive it.
        let flushed = match self.writer.lock() {
            Ok(mut writer) => writer.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        };
        flushed
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        if let Ok(writer) = self.writer.get_mut() {
            let _ = writer.flush();
        }
    }
}

/// Level name as written to the log.
fn level_name(level: Level) -> &'static str {
    if level == Level::WARN {
        "WARNING"
    } else {
        level.as_str()
    }
}

fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    // One entry per line, even for multi-line messages.
    let message = message.replace('\n', " ");
    format!("{timestamp} - {} - {message}\n", level_name(level))
}
