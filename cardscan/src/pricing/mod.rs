//! Price source abstraction and batch fetching
//!
//! A `PriceSource` answers one batch of normalized keys at a time. The
//! fetch engine in `fetcher` drives it with bounded concurrency and retries
//! rate-limited batches; failures never escape the engine.

pub mod fetcher;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub use fetcher::{chunk_keys, BatchFetcher, BatchProgress, FetchConfig, FetchReport};
pub use mock::MockPriceSource;

/// Price answer for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// `None` when the source knows the item but has no price
    pub price: Option<f64>,
    pub url: String,
}

impl PriceQuote {
    pub fn new(price: Option<f64>, url: impl Into<String>) -> Self {
        Self {
            price,
            url: url.into(),
        }
    }
}

/// Key -> quote mapping returned by a source or the fetch engine
pub type PriceMap = HashMap<String, PriceQuote>;

/// Failure of a single `fetch_prices` call
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Minimum wait before the next attempt, when the source names one
        retry_after: Option<Duration>,
    },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Price source call timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether the retry policy should back off and try again
    pub fn is_rate_limited(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } => true,
            FetchError::Http { status, .. } => *status == 429,
            _ => false,
        }
    }
}

/// Pluggable price lookup capability
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Look up prices for one batch of normalized keys
    ///
    /// Keys missing from the returned map stay unresolved.
    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError>;
}
