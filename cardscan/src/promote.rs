//! Baseline promotion
//!
//! Promotion is the only writer of `first_seen`. A record whose normalized
//! key was already in the previous baseline keeps that baseline's
//! `first_seen`; every other record gets the promotion timestamp.

use cardscan_common::store::DataPaths;
use cardscan_common::{Result, SnapshotRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

/// Build a new baseline from `current`, carrying first-seen provenance
pub fn promote(
    current: &[SnapshotRecord],
    existing_baseline: Option<&[SnapshotRecord]>,
    now: DateTime<Utc>,
) -> Vec<SnapshotRecord> {
    let prior_first_seen: HashMap<String, DateTime<Utc>> = existing_baseline
        .unwrap_or_default()
        .iter()
        .filter_map(|record| record.first_seen.map(|ts| (record.key(), ts)))
        .collect();

    current
        .iter()
        .map(|record| {
            let first_seen = prior_first_seen.get(&record.key()).copied().unwrap_or(now);
            SnapshotRecord {
                first_seen: Some(first_seen),
                ..record.clone()
            }
        })
        .collect()
}

/// Replace `baseline.json` with the promoted current snapshot
///
/// # Errors
/// `Error::MissingCurrent` when there is no current snapshot; persistence
/// errors from the atomic write.
pub fn promote_baseline(paths: &DataPaths, now: DateTime<Utc>) -> Result<usize> {
    let current = paths.current_store().load_required()?;
    let baseline_store = paths.baseline_store();
    let existing = baseline_store.load()?;

    let promoted = promote(&current, existing.as_deref(), now);
    let carried = promoted
        .iter()
        .filter(|r| r.first_seen != Some(now))
        .count();

    baseline_store.save(&promoted)?;

    info!(
        records = promoted.len(),
        carried_first_seen = carried,
        path = %baseline_store.path().display(),
        "Baseline promoted"
    );

    Ok(promoted.len())
}

/// Earliest `first_seen` across records, ignoring undated ones
pub fn earliest_first_seen(records: &[SnapshotRecord]) -> Option<DateTime<Utc>> {
    records.iter().filter_map(|r| r.first_seen).min()
}
