//! Deterministic mock price source
//!
//! Prices depend only on `(key, seed)`: SHA-256 of `key|seed`, reduced to
//! cents in `[50, 249]`. The seed defaults to today's UTC date so prices
//! move day to day but are stable within a day.

use super::{FetchError, PriceMap, PriceQuote, PriceSource};
use async_trait::async_trait;
use cardscan_common::time;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::time::Duration;

const MOCK_BASE_URL: &str = "https://example.tcg/";

/// URI component encoding: everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub struct MockPriceSource {
    seed: String,
    latency: Option<Duration>,
}

impl MockPriceSource {
    /// Seeded with today's date (`YYYY-MM-DD`, UTC)
    pub fn new() -> Self {
        Self::with_seed(time::to_date_string(&time::now()))
    }

    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            latency: None,
        }
    }

    /// Sleep this long on every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Price for one key under this seed
    pub fn price_for(&self, key: &str) -> f64 {
        let digest = Sha256::digest(format!("{}|{}", key, self.seed).as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let cents = u64::from_be_bytes(prefix) % 200 + 50;
        cents as f64 / 100.0
    }

    /// Synthetic product URL for one key, with the key percent-encoded
    pub fn url_for(key: &str) -> String {
        format!("{}{}", MOCK_BASE_URL, utf8_percent_encode(key, URI_COMPONENT))
    }
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        Ok(keys
            .iter()
            .map(|key| {
                (
                    key.clone(),
                    PriceQuote::new(Some(self.price_for(key)), Self::url_for(key)),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLT: &str = "lea|161|common|nonfoil|lightning bolt";

    #[test]
    fn test_prices_are_deterministic_per_seed() {
        let a = MockPriceSource::with_seed("2024-01-01");
        let b = MockPriceSource::with_seed("2024-01-01");
        assert_eq!(a.price_for(BOLT), b.price_for(BOLT));
    }

    #[test]
    fn test_prices_stay_in_range() {
        let source = MockPriceSource::with_seed("2024-01-01");
        for i in 0..500 {
            let price = source.price_for(&format!("set|{}|common|foil|card {}", i, i));
            assert!((0.50..=2.49).contains(&price), "price {} out of range", price);
            // Whole cents only
            assert!(((price * 100.0).round() - price * 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seed_changes_some_prices() {
        let day1 = MockPriceSource::with_seed("2024-01-01");
        let day2 = MockPriceSource::with_seed("2024-01-02");
        let differing = (0..50)
            .map(|i| format!("k{}", i))
            .filter(|k| day1.price_for(k) != day2.price_for(k))
            .count();
        assert!(differing > 0);
    }

    #[test]
    fn test_url_is_encoded_under_mock_host() {
        assert_eq!(
            MockPriceSource::url_for(BOLT),
            "https://example.tcg/lea%7C161%7Ccommon%7Cnonfoil%7Clightning%20bolt"
        );
        assert_eq!(
            MockPriceSource::url_for("set/1|it's (alt)~*"),
            "https://example.tcg/set%2F1%7Cit's%20(alt)~*"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_every_requested_key() {
        let source = MockPriceSource::with_seed("2024-01-01");
        let keys = vec![BOLT.to_string(), "c21|263|uncommon|nonfoil|sol ring".to_string()];

        let prices = source.fetch_prices(&keys).await.unwrap();

        assert_eq!(prices.len(), 2);
        for key in &keys {
            let quote = &prices[key];
            assert_eq!(quote.price, Some(source.price_for(key)));
            assert_eq!(quote.url, MockPriceSource::url_for(key));
        }
    }
}
