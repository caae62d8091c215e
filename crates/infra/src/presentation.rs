//! Presentation sink that records what would be shown
//!
//! Stands in for the DOM layer: every callback is logged and appended to an
//! in-memory list. Front ends poll [`RecordingPresenter::take`]; tests
//! assert on [`RecordingPresenter::events`].

use lunchsync_core::PresentationSink;
use lunchsync_domain::Place;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

/// One callback received from the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresentationEvent {
    FeasibilityChanged { place: Place, feasible: bool },
    AttendanceChanged { going: bool },
    PlaceListed { place: Place, available: bool },
    SignInRequired,
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresentationEvent>>,
}

impl RecordingPresenter {
    /// A presenter with nothing recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<PresentationEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<PresentationEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Latest feasibility flag shown for `place`.
    pub fn shown_feasibility(&self, place: &Place) -> Option<bool> {
        self.events.lock().iter().rev().find_map(|event| match event {
            PresentationEvent::FeasibilityChanged { place: shown, feasible } if shown == place => {
                Some(*feasible)
            }
            _ => None,
        })
    }

    fn record(&self, event: PresentationEvent) {
        self.events.lock().push(event);
    }
}

impl PresentationSink for RecordingPresenter {
    fn feasibility_changed(&self, place: &Place, feasible: bool) {
        debug!(%place, feasible, "Feasibility shown");
        self.record(PresentationEvent::FeasibilityChanged { place: place.clone(), feasible });
    }

    fn attendance_changed(&self, going: bool) {
        debug!(going, "Attendance shown");
        self.record(PresentationEvent::AttendanceChanged { going });
    }

    fn place_listed(&self, place: &Place, available: bool) {
        debug!(%place, available, "Place listed");
        self.record(PresentationEvent::PlaceListed { place: place.clone(), available });
    }

    fn sign_in_required(&self) {
        info!("You must sign in first");
        self.record(PresentationEvent::SignInRequired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_feasibility_wins() {
        let presenter = RecordingPresenter::new();
        let sushi = Place::parse("Sushi").unwrap();

        presenter.feasibility_changed(&sushi, true);
        presenter.attendance_changed(true);
        presenter.feasibility_changed(&sushi, false);

        assert_eq!(presenter.shown_feasibility(&sushi), Some(false));
        assert_eq!(presenter.take().len(), 3);
        assert!(presenter.events().is_empty());
    }
}
