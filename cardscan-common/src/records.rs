//! Snapshot and comparison record types

use crate::identity::CardIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry joined with its price at scan time
///
/// Current snapshots never carry `first_seen`. Baseline snapshots carry it
/// on every record once promoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(flatten)]
    pub identity: CardIdentity,
    /// `None` when no price could be obtained (unknown, not zero)
    pub price: Option<f64>,
    pub tcgplayer_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,
}

impl SnapshotRecord {
    pub fn new(identity: CardIdentity, price: Option<f64>, tcgplayer_url: impl Into<String>) -> Self {
        Self {
            identity,
            price,
            tcgplayer_url: tcgplayer_url.into(),
            first_seen: None,
        }
    }

    /// Normalized key of the underlying identity
    pub fn key(&self) -> String {
        self.identity.key()
    }
}

/// A joined baseline/current pair selected by the comparison engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub key: String,
    pub name: String,
    pub set_code: String,
    pub card_number: String,
    pub rarity: String,
    pub finish: String,
    pub baseline_price: f64,
    pub current_price: f64,
    /// Integer percentage, rounded half-up
    pub percent_gain: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_crosser: bool,
}
