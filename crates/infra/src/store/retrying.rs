//! Retry decorator for store adapters
//!
//! Store writes are idempotent upserts keyed by stable identifiers, so a
//! failed call can be repeated verbatim. Retryable failures are retried with
//! exponential backoff; anything else is returned immediately.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lunchsync_core::{AvailabilityStore, Subscription};
use lunchsync_domain::{Result as DomainResult, StoreConfig, StorePath};
use serde_json::Value;
use tracing::{debug, warn};

/// Retry settings for [`RetryingStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt
    pub initial_backoff: Duration,
    /// Upper bound for a single delay
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for RetryConfig {
    fn from(config: &StoreConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            initial_backoff: config.retry_backoff(),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Delay after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Store wrapper that retries retryable failures
pub struct RetryingStore {
    inner: Arc<dyn AvailabilityStore>,
    config: RetryConfig,
}

impl RetryingStore {
    /// Wrap `inner`, retrying transient failures per `config`.
    pub fn new(inner: Arc<dyn AvailabilityStore>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    async fn run<T, F, Fut>(&self, operation: &'static str, path: &StorePath, mut call: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = DomainResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, path = %path, attempt, "Store operation recovered");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff_for(attempt);
                    warn!(
                        operation,
                        path = %path,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying store operation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl AvailabilityStore for RetryingStore {
    async fn once(&self, path: &StorePath) -> DomainResult<Option<Value>> {
        self.run("once", path, || self.inner.once(path)).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        self.run("set", path, || self.inner.set(path, value.clone())).await
    }

    async fn subscribe(&self, path: &StorePath) -> DomainResult<Subscription> {
        self.run("subscribe", path, || self.inner.subscribe(path)).await
    }
}
