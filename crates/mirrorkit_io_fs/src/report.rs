//! Copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{EnumCopyMode, SpecCopyError, SpecCopyPair};

/// Aggregate counters and diagnostics for one copy run or verification.
#[derive(Debug, Clone)]
pub struct ReportCopy {
    /// Mode the source expression classified as.
    pub mode: EnumCopyMode,
    /// Regular files enumerated before filtering.
    pub cnt_scanned: u64,
    /// Files left after the extension filter.
    pub cnt_matched: u64,
    /// Pairs copied successfully.
    pub cnt_copied: u64,
    /// Pairs not copied because of dry-run.
    pub cnt_skipped: u64,
    /// Planned (source, destination) pairs in execution order.
    pub pairs: Vec<SpecCopyPair>,
    /// Non-fatal warnings collected during enumeration/verification.
    pub warnings: Vec<String>,
    /// Per-pair failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// True when no pair failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} mode={:?} scanned={} matched={} copied={} skipped={} errors={} warnings={}",
            self.mode,
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Clone)]
pub struct ReportCopyBuilder {
    pub mode: EnumCopyMode,
    pub cnt_scanned: u64,
    pub cnt_matched: u64,
    pub cnt_copied: u64,
    pub cnt_skipped: u64,
    pub pairs: Vec<SpecCopyPair>,
    pub warnings: Vec<String>,
    pub errors: Vec<SpecCopyError>,
}

impl Default for ReportCopyBuilder {
    fn default() -> Self {
        Self::new(EnumCopyMode::Error)
    }
}

impl ReportCopyBuilder {
    pub fn new(mode: EnumCopyMode) -> Self {
        Self {
            mode,
            cnt_scanned: 0,
            cnt_matched: 0,
            cnt_copied: 0,
            cnt_skipped: 0,
            pairs: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Add to the scanned count.
    pub fn add_scanned(&mut self, value: u64) {
        self.cnt_scanned += value;
    }

    /// Add to the matched count.
    pub fn add_matched(&mut self, value: u64) {
        self.cnt_matched += value;
    }

    /// Increment copied count by one.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecCopyError { path, exception });
    }

    /// Record the planned pair list.
    pub fn set_pairs(&mut self, pairs: Vec<SpecCopyPair>) {
        self.pairs = pairs;
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            mode: self.mode,
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_copied: self.cnt_copied,
            cnt_skipped: self.cnt_skipped,
            pairs: self.pairs,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}
