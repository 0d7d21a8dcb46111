//! Snapshot comparison engine
//!
//! Each function is pure over its two input lists. Both lists are indexed
//! by normalized key (last record wins for duplicate keys, iteration follows
//! first occurrence) and joined; keys present in only one list are ignored.
//! Records with an unknown price never appear in any result.

use cardscan_common::{ComparisonRow, SnapshotRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Both prices must reach this for a gainer
pub const GAINER_MIN_PRICE: f64 = 0.60;
/// Threshold for crossers and fallen
pub const CROSSING_THRESHOLD: f64 = 1.00;
/// Gainers list is truncated to this many rows
pub const MAX_GAINERS: usize = 50;

/// Integer percent change, rounded half-up (toward positive infinity)
///
/// 12.5 -> 13, -1.5 -> -1, -1.5000000000000013 -> -2
pub fn percent_gain(baseline: f64, current: f64) -> i64 {
    round_half_up(((current - baseline) / baseline) * 100.0)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Key -> record index preserving first-occurrence order
struct SnapshotIndex<'a> {
    order: Vec<String>,
    by_key: HashMap<String, &'a SnapshotRecord>,
}

impl<'a> SnapshotIndex<'a> {
    fn build(records: &'a [SnapshotRecord]) -> Self {
        let mut order = Vec::with_capacity(records.len());
        let mut by_key = HashMap::with_capacity(records.len());

        for record in records {
            let key = record.key();
            if by_key.insert(key.clone(), record).is_none() {
                order.push(key);
            }
        }

        Self { order, by_key }
    }

    fn get(&self, key: &str) -> Option<&'a SnapshotRecord> {
        self.by_key.get(key).copied()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &'a SnapshotRecord)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.get(key).map(|record| (key.as_str(), record)))
    }
}

/// Joined pair where baseline is priced above zero and current is priced
struct PricedPair<'a> {
    key: String,
    baseline: &'a SnapshotRecord,
    baseline_price: f64,
    current_price: f64,
}

impl PricedPair<'_> {
    fn percent_gain(&self) -> i64 {
        percent_gain(self.baseline_price, self.current_price)
    }

    fn into_row(self) -> ComparisonRow {
        let percent_gain = self.percent_gain();
        let identity = &self.baseline.identity;
        ComparisonRow {
            key: self.key,
            name: identity.name.clone(),
            set_code: identity.set_code.clone(),
            card_number: identity.card_number.clone(),
            rarity: identity.rarity.clone(),
            finish: identity.finish.clone(),
            baseline_price: self.baseline_price,
            current_price: self.current_price,
            percent_gain,
            is_crosser: false,
        }
    }
}

/// Join both lists in baseline order, keeping priced pairs only
fn priced_pairs<'a>(
    baseline: &'a [SnapshotRecord],
    current: &'a [SnapshotRecord],
) -> Vec<PricedPair<'a>> {
    let baseline_index = SnapshotIndex::build(baseline);
    let current_index = SnapshotIndex::build(current);

    baseline_index
        .iter()
        .filter_map(|(key, baseline_record)| {
            let current_record = current_index.get(key)?;
            let baseline_price = baseline_record.price.filter(|p| *p > 0.0)?;
            // A zero current price is treated as unknown
            let current_price = current_record.price.filter(|p| *p != 0.0)?;
            Some(PricedPair {
                key: key.to_string(),
                baseline: baseline_record,
                baseline_price,
                current_price,
            })
        })
        .collect()
}

/// Top movers with both prices at or above $0.60 and a positive gain
///
/// Sorted by gain descending; ties keep baseline order. At most 50 rows.
pub fn compute_gainers(baseline: &[SnapshotRecord], current: &[SnapshotRecord]) -> Vec<ComparisonRow> {
    let mut gainers: Vec<ComparisonRow> = priced_pairs(baseline, current)
        .into_iter()
        .filter(|pair| {
            pair.baseline_price >= GAINER_MIN_PRICE && pair.current_price >= GAINER_MIN_PRICE
        })
        .map(PricedPair::into_row)
        .filter(|row| row.percent_gain > 0)
        .collect();

    // sort_by is stable
    gainers.sort_by(|a, b| b.percent_gain.cmp(&a.percent_gain));
    gainers.truncate(MAX_GAINERS);
    gainers
}

/// Items that moved from below $1.00 to at or above it
pub fn compute_crossers(baseline: &[SnapshotRecord], current: &[SnapshotRecord]) -> Vec<ComparisonRow> {
    priced_pairs(baseline, current)
        .into_iter()
        .filter(|pair| {
            pair.baseline_price < CROSSING_THRESHOLD && pair.current_price >= CROSSING_THRESHOLD
        })
        .map(|pair| ComparisonRow {
            is_crosser: true,
            ..pair.into_row()
        })
        .collect()
}

/// Items that moved from at or above $1.00 to below it
pub fn compute_fallen(baseline: &[SnapshotRecord], current: &[SnapshotRecord]) -> Vec<ComparisonRow> {
    priced_pairs(baseline, current)
        .into_iter()
        .filter(|pair| {
            pair.baseline_price >= CROSSING_THRESHOLD && pair.current_price < CROSSING_THRESHOLD
        })
        .map(PricedPair::into_row)
        .collect()
}

/// All three comparison sets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub gainers: Vec<ComparisonRow>,
    pub crossers: Vec<ComparisonRow>,
    pub fallen: Vec<ComparisonRow>,
}

/// Compute gainers, crossers and fallen, flagging gainers that also crossed
pub fn compare_snapshots(baseline: &[SnapshotRecord], current: &[SnapshotRecord]) -> Comparison {
    let mut gainers = compute_gainers(baseline, current);
    let crossers = compute_crossers(baseline, current);
    let fallen = compute_fallen(baseline, current);

    let crosser_keys: HashSet<&str> = crossers.iter().map(|row| row.key.as_str()).collect();
    for gainer in &mut gainers {
        if crosser_keys.contains(gainer.key.as_str()) {
            gainer.is_crosser = true;
        }
    }

    Comparison {
        gainers,
        crossers,
        fallen,
    }
}
