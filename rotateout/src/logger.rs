//! Diagnostics on stderr.
//!
//! Stdout is never touched, so rotateout can sit anywhere in a pipeline.
//! Messages go through the [`Logger`] trait so tests can capture them.

use std::io::Write;
use std::sync::{Arc, RwLock};

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Always shown.
    Normal,
    /// Startup settings and rotations (-v).
    Verbose,
    /// Per-chunk detail (-vv).
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Trait for logging output.
pub trait Logger: Send + Sync {
    /// Log a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Log at normal level (always shown).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Log at verbose level (-v).
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Log at debug level (-vv).
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

/// Logger that writes `rotateout: <message>` lines to stderr.
#[derive(Debug)]
pub struct StderrLogger {
    level: Verbosity,
}

impl StderrLogger {
    /// Create a logger that shows messages at `level` and below.
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level <= self.level {
            // Nowhere left to report a failing stderr.
            let _ = writeln!(std::io::stderr().lock(), "rotateout: {}", message);
        }
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Logger that records every message, whatever its level.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    /// Create an empty mock logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured log entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().unwrap().clone()
    }

    /// Captured messages at exactly `level`.
    pub fn messages_at_level(&self, level: Verbosity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Check if any message contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(substring))
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        self.entries.write().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}
