//! Mock identity and presentation ports

use std::sync::Arc;

use lunchsync_core::{IdentityProvider, PresentationSink};
use lunchsync_domain::{Place, UserIdentity};
use parking_lot::Mutex;

/// Identity provider whose signed-in user can be swapped mid-test.
#[derive(Default, Clone)]
pub struct MockIdentity {
    user: Arc<Mutex<Option<UserIdentity>>>,
}

impl MockIdentity {
    pub fn signed_in(user: UserIdentity) -> Self {
        let identity = Self::default();
        identity.sign_in(user);
        identity
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserIdentity) {
        *self.user.lock() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.lock() = None;
    }
}

impl IdentityProvider for MockIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.lock().clone()
    }
}

/// Presentation callback as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Feasibility(Place, bool),
    Attendance(bool),
    Listed(Place, bool),
    SignInPrompt,
}

/// Presentation sink that records every callback.
#[derive(Default, Clone)]
pub struct MockPresenter {
    shown: Arc<Mutex<Vec<Shown>>>,
}

impl MockPresenter {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().clone()
    }

    pub fn sign_in_prompts(&self) -> usize {
        self.shown.lock().iter().filter(|s| **s == Shown::SignInPrompt).count()
    }
}

impl PresentationSink for MockPresenter {
    fn feasibility_changed(&self, place: &Place, feasible: bool) {
        self.shown.lock().push(Shown::Feasibility(place.clone(), feasible));
    }

    fn attendance_changed(&self, going: bool) {
        self.shown.lock().push(Shown::Attendance(going));
    }

    fn place_listed(&self, place: &Place, available: bool) {
        self.shown.lock().push(Shown::Listed(place.clone(), available));
    }

    fn sign_in_required(&self) {
        self.shown.lock().push(Shown::SignInPrompt);
    }
}
