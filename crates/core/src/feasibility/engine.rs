//! Feasibility engine
//!
//! A place is feasible when every attending user has marked it available.
//! With nobody attending every place is feasible. A missing availability
//! entry for an attending user counts as unavailable; seeding on place
//! creation and on first sign-in keeps that case out of normal operation.
//!
//! The engine is a pure function of an [`AvailabilitySnapshot`]. Writing the
//! result back to the store is the coordinator's job.

use lunchsync_domain::{AvailabilitySnapshot, FeasibilityMap, Place, UserId};

/// Compute the feasibility flag of every known place.
///
/// Full recomputation, O(places x users).
pub fn compute_feasibility(snapshot: &AvailabilitySnapshot) -> FeasibilityMap {
    snapshot
        .places
        .iter()
        .map(|place| (place.clone(), is_feasible(snapshot, place)))
        .collect()
}

/// Feasibility of a single place.
pub fn is_feasible(snapshot: &AvailabilitySnapshot, place: &Place) -> bool {
    snapshot.attending_users().all(|user| snapshot.is_available(user, place))
}

/// Attending users who make `place` infeasible.
pub fn blocking_users(snapshot: &AvailabilitySnapshot, place: &Place) -> Vec<UserId> {
    snapshot
        .attending_users()
        .filter(|user| !snapshot.is_available(user, place))
        .cloned()
        .collect()
}
