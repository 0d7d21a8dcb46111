//! Integration tests for scanning into the data directory

mod helpers;

use cardscan::catalog::{build_catalog, mock_raw_catalog, CatalogStore};
use cardscan::pricing::{BatchFetcher, FetchConfig, MockPriceSource};
use cardscan::scan::{build_snapshot, perform_scan, perform_scan_with};
use cardscan_common::store::DataPaths;
use cardscan_common::CardIdentity;
use helpers::{card, FailingKeysSource};
use std::time::Duration;
use tempfile::TempDir;

fn data_dir() -> (TempDir, DataPaths) {
    let temp_dir = TempDir::new().unwrap();
    let paths = DataPaths::new(temp_dir.path());
    paths.ensure_exists().unwrap();
    (temp_dir, paths)
}

#[tokio::test]
async fn test_scan_writes_current_snapshot_in_catalog_order() {
    let (_temp, paths) = data_dir();
    let catalog = build_catalog(&mock_raw_catalog(), None).unwrap();
    let source = MockPriceSource::with_seed("2024-01-01");

    let outcome = perform_scan(&paths, &catalog, &source).await.unwrap();

    let saved = paths.current_store().load().unwrap().unwrap();
    assert_eq!(saved, outcome.records);
    assert_eq!(saved.len(), catalog.len());
    for (record, identity) in saved.iter().zip(&catalog) {
        assert_eq!(&record.identity, identity);
        assert_eq!(record.price, Some(source.price_for(&identity.key())));
        assert_eq!(record.tcgplayer_url, MockPriceSource::url_for(&identity.key()));
        assert!(record.first_seen.is_none());
    }
}

#[tokio::test]
async fn test_scan_appends_one_log_line_per_scan() {
    let (_temp, paths) = data_dir();
    let catalog = build_catalog(&mock_raw_catalog(), None).unwrap();
    let source = MockPriceSource::with_seed("2024-01-01");

    perform_scan(&paths, &catalog, &source).await.unwrap();
    perform_scan(&paths, &catalog, &source).await.unwrap();

    let log = std::fs::read_to_string(paths.scan_log()).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        assert!(line.contains(" SCAN total=8 duration="), "unexpected line: {}", line);
        assert!(line.ends_with("ms failed=0"), "unexpected line: {}", line);
    }
}

#[tokio::test]
async fn test_failed_batch_yields_null_price_and_empty_url() {
    let (_temp, paths) = data_dir();
    let catalog: Vec<CardIdentity> = (0..4).map(|i| card(&format!("Card {}", i))).collect();
    let poisoned = catalog[3].key();
    let source = FailingKeysSource::new(vec![poisoned.clone()]);
    let fetcher = BatchFetcher::new(FetchConfig::new(2, 8).with_backoff_step(Duration::from_millis(1)));

    let outcome = perform_scan_with(&paths, &catalog, &source, &fetcher).await.unwrap();

    assert_eq!(outcome.summary.total, 4);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.records.len(), 4);
    assert!(outcome.records[0].price.is_some());
    assert!(outcome.records[1].price.is_some());
    for record in &outcome.records[2..] {
        assert_eq!(record.price, None);
        assert_eq!(record.tcgplayer_url, "");
    }

    let log = std::fs::read_to_string(paths.scan_log()).unwrap();
    assert!(log.trim_end().ends_with("failed=1"));
}

#[tokio::test]
async fn test_scan_replaces_previous_snapshot() {
    let (_temp, paths) = data_dir();
    let catalog = build_catalog(&mock_raw_catalog(), None).unwrap();

    perform_scan(&paths, &catalog, &MockPriceSource::with_seed("2024-01-01"))
        .await
        .unwrap();
    perform_scan(&paths, &catalog[..2], &MockPriceSource::with_seed("2024-01-02"))
        .await
        .unwrap();

    let saved = paths.current_store().load().unwrap().unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn test_empty_catalog_produces_empty_snapshot() {
    let source = MockPriceSource::with_seed("2024-01-01");

    let outcome = build_snapshot(&[], &source).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.summary.total, 0);
    assert_eq!(outcome.summary.failed, 0);
}

#[tokio::test]
async fn test_rarity_filtered_catalog_is_persisted_and_reused() {
    let (_temp, paths) = data_dir();
    let store = CatalogStore::new(paths.catalog());
    let rares = vec!["Rare".to_string()];

    let catalog = store
        .ensure(|| build_catalog(&mock_raw_catalog(), Some(&rares)), false)
        .unwrap();
    assert!(!catalog.is_empty());
    assert!(catalog.iter().all(|c| c.rarity == "Rare"));

    let reused = store
        .ensure(|| build_catalog(&mock_raw_catalog(), None), false)
        .unwrap();
    assert_eq!(reused, catalog);

    let rebuilt = store
        .ensure(|| build_catalog(&mock_raw_catalog(), None), true)
        .unwrap();
    assert_eq!(rebuilt.len(), mock_raw_catalog().len());
}
