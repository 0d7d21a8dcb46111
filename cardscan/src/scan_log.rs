//! Append-only scan summary log (`scan.log`)
//!
//! One line per scan:
//! `<ISO-8601 timestamp> SCAN total=<N> duration=<N>ms failed=<N>`

use cardscan_common::time;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Outcome counters for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Catalog entries scanned
    pub total: usize,
    pub duration_ms: u64,
    /// Batches abandoned by the fetch engine
    pub failed: usize,
}

impl ScanSummary {
    pub fn log_line(&self, timestamp: &DateTime<Utc>) -> String {
        format!(
            "{} SCAN total={} duration={}ms failed={}",
            time::to_iso(timestamp),
            self.total,
            self.duration_ms,
            self.failed
        )
    }
}

/// Append the summary line to `path`, creating the file if needed
pub fn append_scan_summary(
    path: &Path,
    summary: &ScanSummary,
    timestamp: &DateTime<Utc>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", summary.log_line(timestamp))
}
