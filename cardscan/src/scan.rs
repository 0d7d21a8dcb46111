//! Snapshot producer
//!
//! Joins catalog entries with fetched prices, in catalog order, and
//! persists the result as the new current snapshot.

use crate::pricing::{BatchFetcher, FetchConfig, PriceSource};
use crate::scan_log::{append_scan_summary, ScanSummary};
use cardscan_common::store::DataPaths;
use cardscan_common::{time, CardIdentity, Result, SnapshotRecord};
use std::time::Instant;
use tracing::{info, warn};

/// Keys per price source call during a scan
pub const SCAN_BATCH_SIZE: usize = 100;
/// Batch calls in flight during a scan
pub const SCAN_CONCURRENCY: usize = 8;

/// Fetcher configured with the scan parameters
pub fn scan_fetcher() -> BatchFetcher {
    BatchFetcher::new(FetchConfig::new(SCAN_BATCH_SIZE, SCAN_CONCURRENCY))
}

/// Records and counters from one scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub records: Vec<SnapshotRecord>,
    pub summary: ScanSummary,
}

/// Price every catalog entry with the standard scan parameters
pub async fn build_snapshot(catalog: &[CardIdentity], source: &dyn PriceSource) -> ScanOutcome {
    build_snapshot_with(catalog, source, &scan_fetcher()).await
}

/// Price every catalog entry using `fetcher`
///
/// Unresolved keys produce `price: None` and an empty URL.
pub async fn build_snapshot_with(
    catalog: &[CardIdentity],
    source: &dyn PriceSource,
    fetcher: &BatchFetcher,
) -> ScanOutcome {
    let start = Instant::now();
    let keys: Vec<String> = catalog.iter().map(CardIdentity::key).collect();

    let report = fetcher.fetch(source, &keys).await;

    let records = catalog
        .iter()
        .zip(&keys)
        .map(|(identity, key)| match report.prices.get(key) {
            Some(quote) => SnapshotRecord::new(identity.clone(), quote.price, quote.url.clone()),
            None => SnapshotRecord::new(identity.clone(), None, ""),
        })
        .collect();

    ScanOutcome {
        records,
        summary: ScanSummary {
            total: catalog.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            failed: report.failed_batches,
        },
    }
}

/// Scan, replace `current.json`, and append the scan log line
pub async fn perform_scan(
    paths: &DataPaths,
    catalog: &[CardIdentity],
    source: &dyn PriceSource,
) -> Result<ScanOutcome> {
    perform_scan_with(paths, catalog, source, &scan_fetcher()).await
}

pub async fn perform_scan_with(
    paths: &DataPaths,
    catalog: &[CardIdentity],
    source: &dyn PriceSource,
    fetcher: &BatchFetcher,
) -> Result<ScanOutcome> {
    let outcome = build_snapshot_with(catalog, source, fetcher).await;

    let store = paths.current_store();
    store.save(&outcome.records)?;

    let summary = &outcome.summary;
    info!(
        total = summary.total,
        duration_ms = summary.duration_ms,
        failed = summary.failed,
        path = %store.path().display(),
        "Scan complete"
    );

    if let Err(e) = append_scan_summary(&paths.scan_log(), summary, &time::now()) {
        warn!(error = %e, "Failed to write scan log");
    }

    Ok(outcome)
}
