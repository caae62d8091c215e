//! Snapshot of shared availability state and derived feasibility

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Place, UserId};

/// Point-in-time view of the three store collections.
///
/// Built fresh from the store for every recompute; never mutated in place
/// by the services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub places: BTreeSet<Place>,
    pub availability: BTreeMap<UserId, BTreeMap<Place, bool>>,
    pub attendance: BTreeMap<UserId, bool>,
}

impl AvailabilitySnapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate place.
    pub fn with_place(mut self, place: Place) -> Self {
        self.places.insert(place);
        self
    }

    /// Set one availability entry.
    pub fn with_availability(mut self, user: UserId, place: Place, available: bool) -> Self {
        self.availability.entry(user).or_default().insert(place, available);
        self
    }

    /// Set one attendance flag.
    pub fn with_attendance(mut self, user: UserId, going: bool) -> Self {
        self.attendance.insert(user, going);
        self
    }

    /// Whether `user` marked `place` available.
    ///
    /// A missing entry counts as unavailable.
    pub fn is_available(&self, user: &UserId, place: &Place) -> bool {
        self.availability
            .get(user)
            .and_then(|places| places.get(place))
            .copied()
            .unwrap_or(false)
    }

    /// Attendance of `user`; unknown users are not going.
    pub fn is_attending(&self, user: &UserId) -> bool {
        self.attendance.get(user).copied().unwrap_or(false)
    }

    /// Users whose attendance flag is `true`.
    pub fn attending_users(&self) -> impl Iterator<Item = &UserId> {
        self.attendance.iter().filter(|(_, going)| **going).map(|(user, _)| user)
    }

    /// Every user with either an availability map or an attendance flag.
    pub fn known_users(&self) -> BTreeSet<UserId> {
        self.availability.keys().chain(self.attendance.keys()).cloned().collect()
    }
}

/// Derived feasibility flag per place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeasibilityMap(BTreeMap<Place, bool>);

impl FeasibilityMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the place is unknown.
    pub fn is_feasible(&self, place: &Place) -> Option<bool> {
        self.0.get(place).copied()
    }

    /// Places everyone going can make.
    pub fn feasible_places(&self) -> impl Iterator<Item = &Place> {
        self.0.iter().filter(|(_, feasible)| **feasible).map(|(place, _)| place)
    }

    /// Every place with its flag, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Place, bool)> {
        self.0.iter().map(|(place, feasible)| (place, *feasible))
    }

    /// Number of places.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no places.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of `self` that are new or differ from `previous`.
    pub fn diff(&self, previous: &Self) -> Vec<(Place, bool)> {
        self.0
            .iter()
            .filter(|(place, feasible)| previous.0.get(*place) != Some(*feasible))
            .map(|(place, feasible)| (place.clone(), *feasible))
            .collect()
    }
}

impl FromIterator<(Place, bool)> for FeasibilityMap {
    fn from_iter<T: IntoIterator<Item = (Place, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FeasibilityMap {
    type Item = (Place, bool);
    type IntoIter = std::collections::btree_map::IntoIter<Place, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str) -> Place {
        Place::parse(name).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn missing_availability_counts_as_unavailable() {
        let snapshot = AvailabilitySnapshot::new()
            .with_place(place("A"))
            .with_attendance(user("u1"), true);

        assert!(!snapshot.is_available(&user("u1"), &place("A")));
    }

    #[test]
    fn known_users_include_attendance_only_users() {
        let snapshot = AvailabilitySnapshot::new()
            .with_availability(user("u1"), place("A"), true)
            .with_attendance(user("u2"), false);

        let known: Vec<_> = snapshot.known_users().into_iter().collect();
        assert_eq!(known, vec![user("u1"), user("u2")]);
        assert_eq!(snapshot.attending_users().count(), 0);
    }

    #[test]
    fn diff_reports_new_and_changed_entries() {
        let previous: FeasibilityMap = [(place("A"), true), (place("B"), true)].into_iter().collect();
        let current: FeasibilityMap =
            [(place("A"), true), (place("B"), false), (place("C"), true)].into_iter().collect();

        assert_eq!(current.diff(&previous), vec![(place("B"), false), (place("C"), true)]);
        assert!(current.diff(&current).is_empty());
    }
}
