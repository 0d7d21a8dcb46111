//! Price sources with scripted behavior

use async_trait::async_trait;
use cardscan::pricing::{PriceMap, PriceQuote, PriceSource};
use cardscan::FetchError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn quote_all(keys: &[String]) -> PriceMap {
    keys.iter()
        .map(|k| (k.clone(), PriceQuote::new(Some(1.0), format!("https://example.tcg/{}", k))))
        .collect()
}

/// Fails the first calls with the scripted errors, then answers every key at $1.00
pub struct ScriptedSource {
    failures: Mutex<VecDeque<FetchError>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(failures: Vec<FetchError>) -> Self {
        Self {
            failures: Mutex::new(failures.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_succeeds() -> Self {
        Self::new(Vec::new())
    }

    /// Rate-limited on every call
    pub fn always_rate_limited() -> Self {
        Self::new(vec![FetchError::RateLimited { retry_after: None }; 64])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.failures.lock().unwrap().pop_front();
        match next {
            Some(error) => Err(error),
            None => Ok(quote_all(keys)),
        }
    }
}

/// Fails with a non-retryable error for any batch containing a poisoned key
pub struct FailingKeysSource {
    poisoned: HashSet<String>,
    calls: AtomicUsize,
}

impl FailingKeysSource {
    pub fn new<I: IntoIterator<Item = String>>(poisoned: I) -> Self {
        Self {
            poisoned: poisoned.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FailingKeysSource {
    fn name(&self) -> &str {
        "failing-keys"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if keys.iter().any(|k| self.poisoned.contains(k)) {
            return Err(FetchError::Http {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(quote_all(keys))
    }
}

/// Records the peak number of concurrent calls
pub struct ConcurrencyTracker {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    hold: Duration,
}

impl ConcurrencyTracker {
    pub fn new(hold: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            hold,
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ConcurrencyTracker {
    fn name(&self) -> &str {
        "concurrency-tracker"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.hold).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(quote_all(keys))
    }
}

/// Answers only after `delay`
pub struct SlowSource {
    delay: Duration,
}

impl SlowSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PriceSource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(quote_all(keys))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Start,
    End,
}

/// Holds each call for a per-key delay and records start/end order
///
/// A batch is named by its first key.
pub struct TimelineSource {
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    events: Mutex<Vec<(String, CallEvent)>>,
}

impl TimelineSource {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            delays: HashMap::new(),
            default_delay,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, key: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(key.into(), delay);
        self
    }

    pub fn events(&self) -> Vec<(String, CallEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Position of `event` for the batch starting at `key`
    pub fn position(&self, key: &str, event: CallEvent) -> Option<usize> {
        self.events()
            .iter()
            .position(|(k, e)| k == key && *e == event)
    }
}

#[async_trait]
impl PriceSource for TimelineSource {
    fn name(&self) -> &str {
        "timeline"
    }

    async fn fetch_prices(&self, keys: &[String]) -> Result<PriceMap, FetchError> {
        let first = keys.first().cloned().unwrap_or_default();
        let delay = self.delays.get(&first).copied().unwrap_or(self.default_delay);

        self.events.lock().unwrap().push((first.clone(), CallEvent::Start));
        tokio::time::sleep(delay).await;
        self.events.lock().unwrap().push((first, CallEvent::End));

        Ok(quote_all(keys))
    }
}
