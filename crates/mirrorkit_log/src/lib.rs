//! `mirrorkit_log`:
//! user-facing report sinks for copy runs.
//!
//! Diagnostics go through `tracing`; what the user is meant to read goes
//! through a [`SinkReport`], so callers choose console, tracing, or capture.

use std::io::Write;
use std::sync::Mutex;

/// Severity of one report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumReportLevel {
    Line,
    Info,
    Error,
}

/// Destination for user-facing run messages.
pub trait SinkReport {
    fn emit(&self, level: EnumReportLevel, message: &str);

    fn line(&self, message: &str) {
        self.emit(EnumReportLevel::Line, message);
    }

    fn info(&self, message: &str) {
        self.emit(EnumReportLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.emit(EnumReportLevel::Error, message);
    }
}

/// Plain lines to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkConsole;

impl SinkReport for SinkConsole {
    fn emit(&self, level: EnumReportLevel, message: &str) {
        // Console write failures are ignored.
        let _ = match level {
            EnumReportLevel::Line | EnumReportLevel::Info => {
                writeln!(std::io::stdout().lock(), "{message}")
            }
            EnumReportLevel::Error => writeln!(std::io::stderr().lock(), "{message}"),
        };
    }
}

/// Forward report lines as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkTracing;

impl SinkReport for SinkTracing {
    fn emit(&self, level: EnumReportLevel, message: &str) {
        match level {
            EnumReportLevel::Line => tracing::debug!(target: "mirrorkit::report", "{message}"),
            EnumReportLevel::Info => tracing::info!(target: "mirrorkit::report", "{message}"),
            EnumReportLevel::Error => tracing::error!(target: "mirrorkit::report", "{message}"),
        }
    }
}

/// Discard everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkNull;

impl SinkReport for SinkNull {
    fn emit(&self, _level: EnumReportLevel, _message: &str) {}
}

/// Keep every line in memory.
#[derive(Debug, Default)]
pub struct SinkMemory {
    l_records: Mutex<Vec<(EnumReportLevel, String)>>,
}

impl SinkMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded lines.
    pub fn records(&self) -> Vec<(EnumReportLevel, String)> {
        match self.l_records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Recorded messages at `level`.
    pub fn messages(&self, level: EnumReportLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(lvl, _)| *lvl == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl SinkReport for SinkMemory {
    fn emit(&self, level: EnumReportLevel, message: &str) {
        let mut guard = match self.l_records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, message.to_string()));
    }
}
