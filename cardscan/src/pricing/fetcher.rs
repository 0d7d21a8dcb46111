//! Bounded-concurrency batch price fetching
//!
//! **Algorithm:**
//! 1. Partition keys into consecutive batches of at most `batch_size`
//! 2. Run batches in sequential groups of at most `concurrency`; every batch
//!    in a group runs concurrently and the next group starts only after the
//!    whole group has settled
//! 3. Each batch gets up to `max_attempts` calls:
//!    a. Rate-limited failure: sleep `backoff_step * attempt` (or the
//!       source's `retry_after`, if longer), retry
//!    b. Any other failure, or attempts exhausted: abandon the batch
//! 4. After each batch settles, emit cumulative `BatchProgress`
//! 5. Merge per-batch results into one map
//!
//! Abandoned batches leave their keys absent from the result. The engine
//! itself never fails.

use super::{FetchError, PriceMap, PriceSource};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Batch fetch parameters
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub batch_size: usize,
    /// Maximum batch calls in flight at once
    pub concurrency: usize,
    pub max_attempts: u32,
    /// Linear backoff unit: waits are `backoff_step * attempt`
    pub backoff_step: Duration,
    /// Per-call limit; a timed-out call is not retried
    pub call_timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            concurrency: 8,
            max_attempts: 3,
            backoff_step: Duration::from_millis(250),
            call_timeout: None,
        }
    }
}

impl FetchConfig {
    pub fn new(batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size,
            concurrency,
            ..Default::default()
        }
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

/// Cumulative counts emitted after every batch settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
}

/// Result of a full fetch run
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub prices: PriceMap,
    pub total_batches: usize,
    pub failed_batches: usize,
}

/// Split keys into consecutive slices of at most `size` keys
pub fn chunk_keys(keys: &[String], size: usize) -> Vec<&[String]> {
    keys.chunks(size.max(1)).collect()
}

/// Per-batch retry state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Attempting(u32),
    Backoff { attempt: u32, delay: Duration },
}

/// Terminal state of one batch
#[derive(Debug)]
enum BatchOutcome {
    Resolved { prices: PriceMap, attempts: u32 },
    Abandoned { attempts: u32, error: FetchError },
}

/// Drives a `PriceSource` over a key list in bounded concurrent groups
#[derive(Debug, Clone, Default)]
pub struct BatchFetcher {
    config: FetchConfig,
    progress: Option<UnboundedSender<BatchProgress>>,
}

impl BatchFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Send a `BatchProgress` to `sender` after every batch settles
    pub fn with_progress(mut self, sender: UnboundedSender<BatchProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch prices for every key; unresolved keys are absent
    pub async fn fetch(&self, source: &dyn PriceSource, keys: &[String]) -> FetchReport {
        if keys.is_empty() {
            return FetchReport::default();
        }

        let concurrency = self.config.concurrency.max(1);
        let batches = chunk_keys(keys, self.config.batch_size);
        let total = batches.len();
        let start = Instant::now();

        info!(
            source = source.name(),
            keys = keys.len(),
            batches = total,
            batch_size = self.config.batch_size,
            concurrency,
            "Starting batch price fetch"
        );

        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let mut prices = PriceMap::with_capacity(keys.len());

        for (group_index, group) in batches.chunks(concurrency).enumerate() {
            let completed = &completed;
            let failed = &failed;

            let futures = group.iter().enumerate().map(|(offset, batch)| {
                let batch_index = group_index * concurrency + offset;
                async move {
                    let outcome = self.run_batch(source, batch_index, batch).await;
                    let is_failure = matches!(outcome, BatchOutcome::Abandoned { .. });
                    self.record_settled(completed, failed, total, is_failure);
                    outcome
                }
            });

            // Barrier: the whole group settles before the next one starts
            for outcome in join_all(futures).await {
                if let BatchOutcome::Resolved { prices: batch_prices, .. } = outcome {
                    prices.extend(batch_prices);
                }
            }
        }

        let failed_batches = failed.load(Ordering::Relaxed);
        info!(
            resolved = prices.len(),
            unresolved = keys.len().saturating_sub(prices.len()),
            failed_batches,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch price fetch complete"
        );

        FetchReport {
            prices,
            total_batches: total,
            failed_batches,
        }
    }

    async fn run_batch(
        &self,
        source: &dyn PriceSource,
        batch_index: usize,
        keys: &[String],
    ) -> BatchOutcome {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = BatchState::Attempting(1);

        loop {
            state = match state {
                BatchState::Attempting(attempt) => match self.call_source(source, keys).await {
                    Ok(prices) => {
                        if attempt > 1 {
                            debug!(batch = batch_index, attempt, "Batch succeeded after retry");
                        }
                        let outcome = BatchOutcome::Resolved {
                            prices,
                            attempts: attempt,
                        };
                        log_outcome(batch_index, keys.len(), &outcome);
                        return outcome;
                    }
                    Err(error) if error.is_rate_limited() && attempt < max_attempts => {
                        let mut delay = self.config.backoff_step * attempt;
                        if let FetchError::RateLimited {
                            retry_after: Some(retry_after),
                        } = &error
                        {
                            delay = delay.max(*retry_after);
                        }
                        warn!(
                            batch = batch_index,
                            attempt,
                            backoff_ms = delay.as_millis() as u64,
                            error = %error,
                            "Batch rate limited, will retry after backoff"
                        );
                        BatchState::Backoff { attempt, delay }
                    }
                    Err(error) => {
                        let outcome = BatchOutcome::Abandoned {
                            attempts: attempt,
                            error,
                        };
                        log_outcome(batch_index, keys.len(), &outcome);
                        return outcome;
                    }
                },
                BatchState::Backoff { attempt, delay } => {
                    tokio::time::sleep(delay).await;
                    BatchState::Attempting(attempt + 1)
                }
            };
        }
    }

    async fn call_source(
        &self,
        source: &dyn PriceSource,
        keys: &[String],
    ) -> Result<PriceMap, FetchError> {
        match self.config.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, source.fetch_prices(keys)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(limit)),
            },
            None => source.fetch_prices(keys).await,
        }
    }

    fn record_settled(
        &self,
        completed: &AtomicUsize,
        failed: &AtomicUsize,
        total: usize,
        is_failure: bool,
    ) {
        let completed_now = completed.fetch_add(1, Ordering::Relaxed) + 1;
        let failed_now = if is_failure {
            failed.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            failed.load(Ordering::Relaxed)
        };

        if let Some(sender) = &self.progress {
            // Receiver may have been dropped; progress is advisory
            let _ = sender.send(BatchProgress {
                completed: completed_now,
                total,
                failed: failed_now,
            });
        }
    }
}

fn log_outcome(batch_index: usize, key_count: usize, outcome: &BatchOutcome) {
    match outcome {
        BatchOutcome::Resolved { prices, attempts } => debug!(
            batch = batch_index,
            keys = key_count,
            resolved = prices.len(),
            attempts,
            "Batch resolved"
        ),
        BatchOutcome::Abandoned { attempts, error } => warn!(
            batch = batch_index,
            keys = key_count,
            attempts,
            error = %error,
            "Batch abandoned, keys left unresolved"
        ),
    }
}
