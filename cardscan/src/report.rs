//! Report assembly and rendering
//!
//! A report against a missing baseline or current snapshot is not an error:
//! it is a well-formed report with empty sections.

use crate::compare::{compare_snapshots, Comparison};
use crate::promote::earliest_first_seen;
use cardscan_common::store::DataPaths;
use cardscan_common::{time, ComparisonRow, Result, SnapshotRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Earliest `first_seen` in the baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_timestamp: Option<DateTime<Utc>>,
    pub current_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub gainers: Vec<ComparisonRow>,
    pub crossers: Vec<ComparisonRow>,
    pub fallen: Vec<ComparisonRow>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.crossers.is_empty() && self.fallen.is_empty()
    }
}

/// Combine the comparison outputs for a baseline/current pair
pub fn assemble_report(
    baseline: Option<&[SnapshotRecord]>,
    current: Option<&[SnapshotRecord]>,
    now: DateTime<Utc>,
) -> Report {
    let (Some(baseline), Some(current)) = (baseline, current) else {
        tracing::info!(
            has_baseline = baseline.is_some(),
            has_current = current.is_some(),
            "Snapshot missing, producing empty report"
        );
        return Report {
            meta: ReportMeta {
                baseline_timestamp: None,
                current_timestamp: now,
            },
            gainers: Vec::new(),
            crossers: Vec::new(),
            fallen: Vec::new(),
        };
    };

    let Comparison {
        gainers,
        crossers,
        fallen,
    } = compare_snapshots(baseline, current);

    Report {
        meta: ReportMeta {
            baseline_timestamp: earliest_first_seen(baseline),
            current_timestamp: now,
        },
        gainers,
        crossers,
        fallen,
    }
}

/// Load both snapshots from the data directory and assemble the report
pub fn generate_report(paths: &DataPaths, now: DateTime<Utc>) -> Result<Report> {
    let baseline = paths.baseline_store().load()?;
    let current = paths.current_store().load()?;

    let report = assemble_report(baseline.as_deref(), current.as_deref(), now);
    tracing::info!(
        gainers = report.gainers.len(),
        crossers = report.crossers.len(),
        fallen = report.fallen.len(),
        "Report generated"
    );
    Ok(report)
}

/// Pad every column to its widest cell, ` | ` separated
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    for row in rows {
        let cells = (0..headers.len())
            .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        lines.push(pad_row(cells));
    }
    lines.join("\n")
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

fn movement_rows(rows: &[ComparisonRow], with_crosser_flag: bool) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut cells = vec![
                row.name.clone(),
                row.set_code.clone(),
                money(row.baseline_price),
                money(row.current_price),
                format!("{}%", row.percent_gain),
            ];
            if with_crosser_flag {
                cells.push(if row.is_crosser { "YES" } else { "" }.to_string());
            }
            cells
        })
        .collect()
}

/// Human-readable tables for the terminal
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Report generated at {}",
        time::to_iso(&report.meta.current_timestamp)
    );
    if let Some(baseline) = &report.meta.baseline_timestamp {
        let _ = writeln!(out, "Baseline from {}", time::to_iso(baseline));
    }

    let sections: [(&str, &[ComparisonRow], &[&str], &str, bool); 3] = [
        (
            "TOP GAINERS",
            report.gainers.as_slice(),
            &["Name", "Set", "Baseline", "Current", "Gain%", "Crosser"],
            "No gainers found",
            true,
        ),
        (
            "$1.00 CROSSERS",
            report.crossers.as_slice(),
            &["Name", "Set", "Baseline", "Current", "Gain%"],
            "No crossers found",
            false,
        ),
        (
            "FALLEN BELOW $1.00",
            report.fallen.as_slice(),
            &["Name", "Set", "Baseline", "Current", "Loss%"],
            "No fallen cards found",
            false,
        ),
    ];

    for (title, rows, headers, empty_message, with_flag) in sections {
        let _ = writeln!(out, "\n=== {} ===", title);
        if rows.is_empty() {
            let _ = writeln!(out, "{}", empty_message);
        } else {
            let _ = writeln!(out, "{}", format_table(headers, &movement_rows(rows, with_flag)));
        }
    }

    out
}
