//! Lunch coordination service - core business logic
//!
//! Serialises the user-initiated mutations (sign-in registration, place
//! submission, attendance and availability toggles) against the shared
//! store and recomputes feasibility after each of them.
//!
//! # Trigger policy
//!
//! Each mutation runs exactly one explicit [`LunchCoordinator::recompute`]
//! after its writes complete. Changes made by other sessions are picked up
//! by the feasibility watcher in `lunchsync-infra`, which calls the same
//! entry point. While a watcher is attached (see
//! [`LunchCoordinator::track_local_writes`]) every input write is recorded,
//! and the watcher claims the matching notifications through
//! [`LunchCoordinator::claim_local_change`] instead of recomputing again.
//!
//! # Registration
//!
//! Mutations from a user without an attendance flag register that user
//! first, so an attending user always has an entry for every place.
//!
//! # Consistency
//!
//! Reads are not transactional. A recompute may run against a snapshot that
//! a concurrent write has already superseded; it still writes its result and
//! the notification for the newer write triggers the corrective run. The
//! cached snapshot only ever moves forward in generation order.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lunchsync_domain::constants::{DEFAULT_STORE_TIMEOUT_MS, LOCAL_WRITE_TTL_MS};
use lunchsync_domain::{
    ChangeEvent, Collection, FeasibilityMap, LunchError, Place, Result, StorePath, UserIdentity,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::decode::{decode_availability, decode_attendance, decode_places, decode_snapshot};
use super::engine::compute_feasibility;
use super::local_writes::LocalWrites;
use crate::session::ports::{IdentityProvider, PresentationSink};
use crate::store::ports::AvailabilityStore;

/// Outcome of registering a signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: UserIdentity,
    pub attending: bool,
    /// `true` on the user's first sign-in, when availability was seeded
    pub newly_registered: bool,
}

#[derive(Debug, Default)]
struct CachedFeasibility {
    generation: u64,
    feasibility: FeasibilityMap,
}

/// Lunch coordination service
pub struct LunchCoordinator {
    store: Arc<dyn AvailabilityStore>,
    identity: Arc<dyn IdentityProvider>,
    presenter: Arc<dyn PresentationSink>,
    operation_timeout: Duration,
    generations: AtomicU64,
    cached: Mutex<CachedFeasibility>,
    local_writes: LocalWrites,
}

impl LunchCoordinator {
    /// Create a new coordination service
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        identity: Arc<dyn IdentityProvider>,
        presenter: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            store,
            identity,
            presenter,
            operation_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            generations: AtomicU64::new(0),
            cached: Mutex::new(CachedFeasibility::default()),
            local_writes: LocalWrites::new(Duration::from_millis(LOCAL_WRITE_TTL_MS)),
        }
    }

    /// Bound every store round trip by `timeout`.
    ///
    /// An expired call fails with `LunchError::StoreUnavailable`.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Register the signed-in user.
    ///
    /// On the first sign-in every known place is seeded as available. A
    /// missing attendance flag is initialised to "not going". The
    /// presentation layer receives the current attendance status.
    #[instrument(skip(self))]
    pub async fn register_session(&self) -> Result<SessionState> {
        let user = self.require_user()?;
        let state = self.register(user).await?;
        self.presenter.attendance_changed(state.attending);
        Ok(state)
    }

    async fn register(&self, user: UserIdentity) -> Result<SessionState> {
        let uid = user.uid.clone();

        let users = self.read(&StorePath::users()).await?;
        let going = self.read(&StorePath::attendance_all()).await?;
        let known = decode_availability(users.as_ref()).contains_key(&uid)
            || decode_attendance(going.as_ref()).contains_key(&uid);

        if !known {
            let places = decode_places(self.read(&StorePath::places()).await?.as_ref());
            info!(user = %uid, places = places.len(), "Seeding availability for new user");
            for (place, _) in places.iter() {
                self.write(&StorePath::availability(&uid, place), Value::Bool(true)).await?;
            }
        }

        let attendance_path = StorePath::attendance(&uid);
        let attending = match self.read(&attendance_path).await?.as_ref().and_then(Value::as_bool) {
            Some(going) => going,
            None => {
                self.write(&attendance_path, Value::Bool(false)).await?;
                false
            }
        };

        Ok(SessionState { user, attending, newly_registered: !known })
    }

    /// Propose a new place and seed it as available for every known user.
    ///
    /// Seeding only fills missing entries, so re-submitting an existing place
    /// never overwrites anyone's choice. The seeding writes are independent:
    /// if one fails, entries already written stay and the call fails with
    /// `StoreUnavailable`.
    #[instrument(skip(self))]
    pub async fn submit_place(&self, name: &str) -> Result<FeasibilityMap> {
        let user = self.require_user()?;
        let place = Place::from_input(name)?;

        let places = decode_places(self.read(&StorePath::places()).await?.as_ref());
        if places.is_feasible(&place).is_none() {
            self.write(&StorePath::place(&place), Value::Bool(true)).await?;
        }

        let users = self.read(&StorePath::users()).await?;
        let going = self.read(&StorePath::attendance_all()).await?;
        let snapshot = decode_snapshot(None, users.as_ref(), going.as_ref());
        let mut targets = snapshot.known_users();
        targets.insert(user.uid.clone());

        let mut seeded = 0_usize;
        for uid in &targets {
            let has_entry =
                snapshot.availability.get(uid).is_some_and(|entries| entries.contains_key(&place));
            if has_entry {
                continue;
            }
            if let Err(err) =
                self.write(&StorePath::availability(uid, &place), Value::Bool(true)).await
            {
                warn!(
                    place = %place,
                    user = %uid,
                    seeded,
                    error = %err,
                    "Seeding new place failed part-way"
                );
                return Err(err);
            }
            seeded += 1;
        }

        info!(place = %place, by = %user.uid, seeded, "Place submitted");
        self.recompute().await
    }

    /// Flip the signed-in user's attendance and recompute.
    ///
    /// Returns the new attendance flag.
    #[instrument(skip(self))]
    pub async fn toggle_attendance(&self) -> Result<bool> {
        let user = self.require_user()?;
        let going = !self.attendance_of(&user).await?;
        self.write(&StorePath::attendance(&user.uid), Value::Bool(going)).await?;
        self.presenter.attendance_changed(going);
        info!(user = %user.uid, going, "Attendance toggled");

        self.recompute().await?;
        Ok(going)
    }

    /// Record whether the signed-in user can make it to `place`.
    ///
    /// `place` must already be proposed; otherwise the call fails with
    /// `InvalidInput` and nothing is written.
    #[instrument(skip(self))]
    pub async fn set_availability(&self, place: &Place, available: bool) -> Result<FeasibilityMap> {
        let user = self.require_user()?;
        self.require_place(place).await?;
        self.attendance_of(&user).await?;

        let path = StorePath::availability(&user.uid, place);
        if self.read(&path).await?.as_ref().and_then(Value::as_bool) == Some(available) {
            debug!(user = %user.uid, place = %place, available, "Availability unchanged");
        } else {
            self.write(&path, Value::Bool(available)).await?;
            debug!(user = %user.uid, place = %place, available, "Availability updated");
        }
        self.recompute().await
    }

    /// Flip the signed-in user's availability for `place`.
    ///
    /// A missing entry counts as unavailable, so the first toggle marks it
    /// available. Returns the new flag.
    #[instrument(skip(self))]
    pub async fn toggle_availability(&self, place: &Place) -> Result<bool> {
        let user = self.require_user()?;
        self.require_place(place).await?;
        self.attendance_of(&user).await?;
        let path = StorePath::availability(&user.uid, place);

        let available =
            !self.read(&path).await?.as_ref().and_then(Value::as_bool).unwrap_or(false);
        self.write(&path, Value::Bool(available)).await?;
        debug!(user = %user.uid, place = %place, available, "Availability toggled");

        self.recompute().await?;
        Ok(available)
    }

    /// Recompute feasibility for every place from a fresh snapshot and
    /// write changed flags back to `places/<place>`.
    ///
    /// On failure the cached snapshot is left untouched.
    #[instrument(skip(self))]
    pub async fn recompute(&self) -> Result<FeasibilityMap> {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;

        let places = self.read(&StorePath::places()).await?;
        let users = self.read(&StorePath::users()).await?;
        let going = self.read(&StorePath::attendance_all()).await?;

        let stored = decode_places(places.as_ref());
        let snapshot = decode_snapshot(places.as_ref(), users.as_ref(), going.as_ref());
        let feasibility = compute_feasibility(&snapshot);

        let changed = feasibility.diff(&stored);
        for (place, feasible) in &changed {
            let path = StorePath::place(place);
            self.bounded("set", &path, self.store.set(&path, Value::Bool(*feasible))).await?;
        }

        {
            let mut cached = self.cached.lock();
            if generation > cached.generation {
                cached.generation = generation;
                cached.feasibility = feasibility.clone();
            } else {
                debug!(generation, latest = cached.generation, "Superseded recompute finished");
            }
        }

        debug!(
            generation,
            places = feasibility.len(),
            attending = snapshot.attending_users().count(),
            written = changed.len(),
            "Feasibility recomputed"
        );
        Ok(feasibility)
    }

    /// The most recent successfully computed feasibility map.
    pub fn current_feasibility(&self) -> FeasibilityMap {
        self.cached.lock().feasibility.clone()
    }

    /// Number of recompute runs started so far.
    pub fn recompute_count(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.identity.current_user()
    }

    /// Start or stop recording this session's input writes.
    ///
    /// Turned on by a watcher that claims them with
    /// [`Self::claim_local_change`]. Turning it off drops anything unclaimed.
    pub fn track_local_writes(&self, enabled: bool) {
        self.local_writes.set_enabled(enabled);
    }

    /// Whether `change` under `collection` was written by this session.
    ///
    /// A matching record is consumed, so each write is claimed once.
    pub fn claim_local_change(&self, collection: Collection, change: &ChangeEvent) -> bool {
        self.local_writes.claim(collection, change)
    }

    /// Attendance of `user`, registering them first if they have no flag yet.
    async fn attendance_of(&self, user: &UserIdentity) -> Result<bool> {
        let path = StorePath::attendance(&user.uid);
        match self.read(&path).await?.as_ref().and_then(Value::as_bool) {
            Some(going) => Ok(going),
            None => {
                info!(user = %user.uid, "Registering user before first mutation");
                Ok(self.register(user.clone()).await?.attending)
            }
        }
    }

    async fn require_place(&self, place: &Place) -> Result<()> {
        if self.read(&StorePath::place(place)).await?.is_none() {
            return Err(LunchError::InvalidInput(format!("unknown place '{place}'")));
        }
        Ok(())
    }

    fn require_user(&self) -> Result<UserIdentity> {
        self.identity.current_user().ok_or_else(|| {
            debug!("Rejected mutation from anonymous caller");
            self.presenter.sign_in_required();
            LunchError::AuthenticationRequired
        })
    }

    async fn read(&self, path: &StorePath) -> Result<Option<Value>> {
        self.bounded("once", path, self.store.once(path)).await
    }

    /// Write one of the engine's inputs on behalf of the signed-in user.
    async fn write(&self, path: &StorePath, value: Value) -> Result<()> {
        let recorded = self.local_writes.record(path, &value);
        let result = self.bounded("set", path, self.store.set(path, value.clone())).await;
        if result.is_err() && recorded {
            self.local_writes.forget(path, &value);
        }
        result
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        path: &StorePath,
        call: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(operation, path = %path, error = %err, "Store operation failed");
                Err(err)
            }
            Err(_) => {
                warn!(
                    operation,
                    path = %path,
                    timeout_ms = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Store operation timed out"
                );
                Err(LunchError::store(format!(
                    "{operation} {path} timed out after {}ms",
                    self.operation_timeout.as_millis()
                )))
            }
        }
    }
}
