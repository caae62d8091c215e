//! Application context - dependency injection container
//!
//! Wires one session: the store (wrapped in [`RetryingStore`]), the identity
//! and presentation adapters, the [`LunchCoordinator`] and the two
//! background workers. The front end drives everything through this type.

use std::sync::Arc;

use lunchsync_core::{AvailabilityStore, LunchCoordinator, SessionState};
use lunchsync_domain::{AppConfig, LunchError, UserIdentity};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::identity::SessionIdentity;
use crate::presentation::RecordingPresenter;
use crate::store::{InMemoryStore, RetryConfig, RetryingStore};
use crate::sync::{FeasibilityWatcher, FeasibilityWatcherConfig, SessionMirror, WorkerError};

/// Errors from session lifecycle calls
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Lunch(#[from] LunchError),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Application context - holds all services and workers of one session
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn AvailabilityStore>,
    pub identity: Arc<SessionIdentity>,
    pub presenter: Arc<RecordingPresenter>,
    pub coordinator: Arc<LunchCoordinator>,
    watcher: FeasibilityWatcher,
    mirror: Option<SessionMirror>,
}

impl AppContext {
    /// Build a context on top of `backend`.
    pub fn new(config: AppConfig, backend: Arc<dyn AvailabilityStore>) -> Self {
        let store: Arc<dyn AvailabilityStore> =
            Arc::new(RetryingStore::new(backend, RetryConfig::from(&config.store)));
        let identity = Arc::new(SessionIdentity::new());
        let presenter = Arc::new(RecordingPresenter::new());

        let coordinator = Arc::new(
            LunchCoordinator::new(Arc::clone(&store), identity.clone(), presenter.clone())
                .with_operation_timeout(config.store.operation_timeout()),
        );

        let watcher = FeasibilityWatcher::new(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            FeasibilityWatcherConfig::from(&config.feasibility),
        );

        Self { config, store, identity, presenter, coordinator, watcher, mirror: None }
    }

    /// Build a context backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: AppConfig) -> (Self, Arc<InMemoryStore>) {
        let backend = Arc::new(InMemoryStore::new());
        (Self::new(config, backend.clone()), backend)
    }

    /// Sign in, register the session and start mirroring.
    ///
    /// A previous session's mirror is stopped first. The feasibility watcher
    /// is started on the first sign-in when remote watching is enabled. On
    /// failure the session is left signed out with no mirror running.
    #[instrument(skip(self, identity), fields(uid = %identity.uid))]
    pub async fn sign_in(&mut self, identity: UserIdentity) -> Result<SessionState, ContextError> {
        self.stop_mirror().await;
        self.identity.sign_in(identity);

        match self.start_session().await {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(error = %e, "Sign-in failed; signing out again");
                self.stop_mirror().await;
                self.identity.sign_out();
                Err(e)
            }
        }
    }

    async fn start_session(&mut self) -> Result<SessionState, ContextError> {
        let state = self.coordinator.register_session().await?;

        let mut mirror = SessionMirror::new(
            Arc::clone(&self.store),
            self.presenter.clone(),
            state.user.uid.clone(),
        )
        .with_join_timeout(self.config.feasibility.join_timeout());
        mirror.start().await?;
        self.mirror = Some(mirror);

        if self.config.feasibility.watch_remote_changes && !self.watcher.is_running() {
            self.watcher.start().await?;
        }

        info!(attending = state.attending, newly_registered = state.newly_registered, "Session ready");
        Ok(state)
    }

    /// Sign out and stop mirroring. The watcher keeps running.
    #[instrument(skip(self))]
    pub async fn sign_out(&mut self) {
        self.stop_mirror().await;
        self.identity.sign_out();
    }

    /// Stop every background worker.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) -> Result<(), ContextError> {
        self.stop_mirror().await;
        if self.watcher.is_running() {
            self.watcher.stop().await?;
        }
        info!("Context shut down");
        Ok(())
    }

    /// Whether the feasibility watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_running()
    }

    /// Whether a session mirror is running.
    pub fn is_mirroring(&self) -> bool {
        self.mirror.as_ref().is_some_and(SessionMirror::is_running)
    }

    async fn stop_mirror(&mut self) {
        if let Some(mut mirror) = self.mirror.take() {
            if let Err(e) = mirror.stop().await {
                warn!(uid = %mirror.user(), error = %e, "Failed to stop session mirror cleanly");
            }
        }
    }
}
