//! Test Helper Utilities
//!
//! Scripted price sources and snapshot builders shared by the integration tests

#![allow(dead_code, unused_imports)]

pub mod sources;

pub use sources::{
    CallEvent, ConcurrencyTracker, FailingKeysSource, ScriptedSource, SlowSource, TimelineSource,
};

use cardscan_common::{CardIdentity, SnapshotRecord};

/// `count` distinct keys, `key-0000` onwards
pub fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key-{:04}", i)).collect()
}

/// Identity whose normalized key is unique per `name`
pub fn card(name: &str) -> CardIdentity {
    CardIdentity::new(name, "TST", "1", "Rare", "Nonfoil")
}

pub fn record(name: &str, price: Option<f64>) -> SnapshotRecord {
    SnapshotRecord::new(card(name), price, format!("https://example.tcg/{}", name))
}
