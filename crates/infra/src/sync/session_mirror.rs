//! Store-to-presentation mirroring for one signed-in user.
//!
//! Subscribes to `users/<uid>` and `places` and forwards every added or
//! changed child to the [`PresentationSink`] in the order the store applied
//! the writes:
//!
//! - `users/<uid>/<place>` → [`PresentationSink::place_listed`]
//! - `places/<place>` → [`PresentationSink::feasibility_changed`]
//!
//! Children with keys that are not valid place names, or with non-boolean
//! values, are skipped with a warning.

use std::sync::Arc;
use std::time::Duration;

use lunchsync_core::{AvailabilityStore, PresentationSink, Subscription};
use lunchsync_domain::constants::DEFAULT_WATCHER_JOIN_TIMEOUT_MS;
use lunchsync_domain::{ChangeEvent, Collection, Place, StorePath, UserId};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::WorkerMetrics;
use crate::sync::errors::{join_worker, WorkerError};

/// Mirror with explicit lifecycle management.
pub struct SessionMirror {
    store: Arc<dyn AvailabilityStore>,
    presenter: Arc<dyn PresentationSink>,
    user: UserId,
    join_timeout: Duration,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    metrics: Arc<WorkerMetrics>,
}

impl SessionMirror {
    /// Create a stopped mirror for `user`.
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        presenter: Arc<dyn PresentationSink>,
        user: UserId,
    ) -> Self {
        Self {
            store,
            presenter,
            user,
            join_timeout: Duration::from_millis(DEFAULT_WATCHER_JOIN_TIMEOUT_MS),
            cancellation: CancellationToken::new(),
            task_handle: None,
            metrics: Arc::new(WorkerMetrics::new()),
        }
    }

    /// Override how long [`Self::stop`] waits for the loop.
    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    /// The user whose list is mirrored.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Subscribe and spawn the forwarding loop.
    ///
    /// The current list and results are replayed as `Added` events first.
    #[instrument(skip(self), fields(uid = %self.user))]
    pub async fn start(&mut self) -> Result<(), WorkerError> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning);
        }

        let availability = self.store.subscribe(&StorePath::user(&self.user)).await?;
        let results = self.store.subscribe(&StorePath::places()).await?;

        self.cancellation = CancellationToken::new();

        let presenter = Arc::clone(&self.presenter);
        let cancel = self.cancellation.clone();
        let metrics = Arc::clone(&self.metrics);

        let handle = tokio::spawn(async move {
            Self::forward_loop(availability, results, presenter, cancel, metrics).await;
        });

        self.task_handle = Some(handle);
        info!("Session mirror started");

        Ok(())
    }

    /// Stop forwarding and wait for the loop to finish.
    #[instrument(skip(self), fields(uid = %self.user))]
    pub async fn stop(&mut self) -> Result<(), WorkerError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(WorkerError::NotRunning);
        };

        self.cancellation.cancel();
        join_worker(handle, self.join_timeout).await?;

        self.cancellation = CancellationToken::new();
        info!("Session mirror stopped");

        Ok(())
    }

    /// Whether the forwarding loop has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Counters shared with the forwarding loop.
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    async fn forward_loop(
        mut availability: Subscription,
        mut results: Subscription,
        presenter: Arc<dyn PresentationSink>,
        cancel: CancellationToken,
        metrics: Arc<WorkerMetrics>,
    ) {
        loop {
            let (collection, event) = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Session mirror loop cancelled");
                    break;
                }
                event = availability.next() => (Collection::Users, event),
                event = results.next() => (Collection::Places, event),
            };

            let Some(change) = event else {
                warn!(%collection, "Store subscription closed; session mirror exiting");
                break;
            };

            metrics.record_event();
            if forward(presenter.as_ref(), collection, &change) {
                metrics.record_forwarded();
            } else {
                metrics.record_ignored();
            }
        }
    }
}

/// Hand one change to the presenter. `false` if the change was skipped.
fn forward(presenter: &dyn PresentationSink, collection: Collection, change: &ChangeEvent) -> bool {
    let place = match Place::parse(&change.key) {
        Ok(place) => place,
        Err(e) => {
            warn!(%collection, key = %change.key, error = %e, "Skipping child with invalid key");
            return false;
        }
    };
    let Some(flag) = change.as_bool() else {
        warn!(%collection, key = %change.key, value = %change.value, "Skipping non-boolean child");
        return false;
    };

    match collection {
        Collection::Users => presenter.place_listed(&place, flag),
        Collection::Places => presenter.feasibility_changed(&place, flag),
        Collection::Attendance => presenter.attendance_changed(flag),
    }
    true
}

impl Drop for SessionMirror {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(uid = %self.user, "SessionMirror dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}
