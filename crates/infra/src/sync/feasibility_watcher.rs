//! Recompute loop for changes made by other sessions.
//!
//! Local mutations run their own recompute. This worker covers everything
//! else: it subscribes to `places`, `users` and `going`, coalesces bursts of
//! notifications within a debounce window and then runs one
//! [`LunchCoordinator::recompute`].
//!
//! `Changed` events on `places` are ignored because those are the engine's
//! own write-back. Reacting to them would recompute forever. Writes made by
//! this session's coordinator are ignored too: the mutation that issued them
//! has already recomputed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lunchsync_core::{AvailabilityStore, LunchCoordinator};
//! use lunchsync_infra::sync::{FeasibilityWatcher, FeasibilityWatcherConfig};
//!
//! # async fn example(
//! #     store: Arc<dyn AvailabilityStore>,
//! #     coordinator: Arc<LunchCoordinator>,
//! # ) -> Result<(), lunchsync_infra::sync::WorkerError> {
//! let mut watcher =
//!     FeasibilityWatcher::new(store, coordinator, FeasibilityWatcherConfig::default());
//!
//! watcher.start().await?;
//! // ... other sessions edit the store ...
//! watcher.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use lunchsync_core::{AvailabilityStore, LunchCoordinator, Subscription};
use lunchsync_domain::{ChangeEvent, ChangeKind, Collection, FeasibilityConfig, StorePath};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::WorkerMetrics;
use crate::sync::errors::{join_worker, WorkerError};

/// Configuration for the feasibility watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityWatcherConfig {
    /// Window in which notifications are coalesced into one recompute
    pub debounce: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for FeasibilityWatcherConfig {
    fn default() -> Self {
        Self::from(&FeasibilityConfig::default())
    }
}

impl From<&FeasibilityConfig> for FeasibilityWatcherConfig {
    fn from(config: &FeasibilityConfig) -> Self {
        Self { debounce: config.recompute_debounce(), join_timeout: config.join_timeout() }
    }
}

/// Watcher with explicit lifecycle management.
pub struct FeasibilityWatcher {
    store: Arc<dyn AvailabilityStore>,
    coordinator: Arc<LunchCoordinator>,
    config: FeasibilityWatcherConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    metrics: Arc<WorkerMetrics>,
}

/// The three collections the engine reads
struct Feeds {
    places: Subscription,
    users: Subscription,
    going: Subscription,
}

impl FeasibilityWatcher {
    /// Create a stopped watcher.
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        coordinator: Arc<LunchCoordinator>,
        config: FeasibilityWatcherConfig,
    ) -> Self {
        Self {
            store,
            coordinator,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
            metrics: Arc::new(WorkerMetrics::new()),
        }
    }

    /// Subscribe to the store and spawn the watch loop.
    ///
    /// Existing children are announced as `Added` on subscription, so the
    /// first debounce window always ends in a recompute.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), WorkerError> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning);
        }

        info!("Starting feasibility watcher");

        let feeds = Feeds {
            places: self.store.subscribe(&StorePath::places()).await?,
            users: self.store.subscribe(&StorePath::users()).await?,
            going: self.store.subscribe(&StorePath::attendance_all()).await?,
        };
        self.coordinator.track_local_writes(true);

        self.cancellation = CancellationToken::new();

        let coordinator = Arc::clone(&self.coordinator);
        let debounce = self.config.debounce;
        let cancel = self.cancellation.clone();
        let metrics = Arc::clone(&self.metrics);

        let handle = tokio::spawn(async move {
            Self::watch_loop(feeds, coordinator, debounce, cancel, metrics).await;
        });

        self.task_handle = Some(handle);
        info!("Feasibility watcher started");

        Ok(())
    }

    /// Stop the watcher and wait for the loop to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), WorkerError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(WorkerError::NotRunning);
        };

        info!("Stopping feasibility watcher");
        self.cancellation.cancel();
        self.coordinator.track_local_writes(false);
        join_worker(handle, self.config.join_timeout).await?;

        self.cancellation = CancellationToken::new();
        info!("Feasibility watcher stopped");

        Ok(())
    }

    /// Whether the watch loop has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Counters shared with the watch loop.
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    async fn watch_loop(
        mut feeds: Feeds,
        coordinator: Arc<LunchCoordinator>,
        debounce: Duration,
        cancel: CancellationToken,
        metrics: Arc<WorkerMetrics>,
    ) {
        let mut deadline: Option<Instant> = None;

        loop {
            let wake_at = deadline.unwrap_or_else(Instant::now);

            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Feasibility watcher loop cancelled");
                    break;
                }
                () = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                    deadline = None;
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        result = coordinator.recompute() => {
                            metrics.record_recompute(result.is_ok());
                            if let Err(e) = result {
                                warn!(error = %e, "Watcher recompute failed; waiting for next change");
                            }
                        }
                    }
                    continue;
                }
                event = feeds.places.next() => (Collection::Places, event),
                event = feeds.users.next() => (Collection::Users, event),
                event = feeds.going.next() => (Collection::Attendance, event),
            };

            match event {
                (collection, Some(change)) => {
                    metrics.record_event();
                    if !triggers_recompute(collection, &change) {
                        metrics.record_ignored();
                    } else if coordinator.claim_local_change(collection, &change) {
                        debug!(%collection, key = %change.key, "Own write observed");
                        metrics.record_ignored();
                    } else {
                        debug!(%collection, key = %change.key, kind = %change.kind, "Change observed");
                        deadline.get_or_insert_with(|| Instant::now() + debounce);
                    }
                }
                (collection, None) => {
                    warn!(%collection, "Store subscription closed; feasibility watcher exiting");
                    break;
                }
            }
        }
    }
}

/// Whether a change is an input to the engine rather than its output.
fn triggers_recompute(collection: Collection, change: &ChangeEvent) -> bool {
    !(collection == Collection::Places && change.kind == ChangeKind::Changed)
}

impl Drop for FeasibilityWatcher {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("FeasibilityWatcher dropped while running; cancelling task");
            self.cancellation.cancel();
            self.coordinator.track_local_writes(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn engine_output_does_not_retrigger() {
        let written = ChangeEvent::new(ChangeKind::Changed, "Pizza", json!(false));
        let proposed = ChangeEvent::new(ChangeKind::Added, "Pizza", json!(true));

        assert!(!triggers_recompute(Collection::Places, &written));
        assert!(triggers_recompute(Collection::Places, &proposed));
        assert!(triggers_recompute(Collection::Users, &written));
        assert!(triggers_recompute(Collection::Attendance, &written));
    }

    #[test]
    fn config_follows_feasibility_settings() {
        let settings = FeasibilityConfig {
            recompute_debounce_ms: 5,
            watch_remote_changes: true,
            join_timeout_ms: 250,
        };
        let config = FeasibilityWatcherConfig::from(&settings);

        assert_eq!(config.debounce, Duration::from_millis(5));
        assert_eq!(config.join_timeout, Duration::from_millis(250));
    }
}
