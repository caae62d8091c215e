//! Addressing and change notifications for the path-addressable store

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Place, UserId};
use crate::constants::PATH_SEPARATOR;
use crate::impl_domain_status_conversions;

/// Top-level collections of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// `places/<place>`: existence marker and cached feasibility flag
    Places,
    /// `users/<uid>/<place>`: per-user availability
    Users,
    /// `going/<uid>`: attendance
    #[serde(rename = "going")]
    Attendance,
}

impl_domain_status_conversions!(Collection {
    Places => "places",
    Users => "users",
    Attendance => "going",
});

/// Slash-separated address of a node in the store tree.
///
/// The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorePath(Vec<String>);

impl StorePath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a top-level collection.
    pub fn collection(collection: Collection) -> Self {
        Self::root().child(&collection.to_string())
    }

    /// `places`
    pub fn places() -> Self {
        Self::collection(Collection::Places)
    }

    /// `places/<place>`
    pub fn place(place: &Place) -> Self {
        Self::places().child(place.as_str())
    }

    /// `users`
    pub fn users() -> Self {
        Self::collection(Collection::Users)
    }

    /// `users/<uid>`
    pub fn user(user: &UserId) -> Self {
        Self::users().child(user.as_str())
    }

    /// `users/<uid>/<place>`
    pub fn availability(user: &UserId, place: &Place) -> Self {
        Self::user(user).child(place.as_str())
    }

    /// `going`
    pub fn attendance_all() -> Self {
        Self::collection(Collection::Attendance)
    }

    /// `going/<uid>`
    pub fn attendance(user: &UserId) -> Self {
        Self::attendance_all().child(user.as_str())
    }

    /// `self/<key>`
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments of `self` below `ancestor`, or `None` if `ancestor` is not a
    /// prefix of `self`.
    pub fn relative_to(&self, ancestor: &Self) -> Option<&[String]> {
        self.0.strip_prefix(ancestor.0.as_slice())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for StorePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

/// Kind of change delivered to a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A child appeared under the subscribed path
    Added,
    /// An existing child (or anything nested below it) changed value
    Changed,
}

impl_domain_status_conversions!(ChangeKind {
    Added => "added",
    Changed => "changed",
});

/// Notification about one direct child of a subscribed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Key of the child below the subscribed path
    pub key: String,
    /// Full value of the child after the write
    pub value: serde_json::Value,
}

impl ChangeEvent {
    /// Event for child `key` holding `value`.
    pub fn new(kind: ChangeKind, key: impl Into<String>, value: serde_json::Value) -> Self {
        Self { kind, key: key.into(), value }
    }

    /// The value as a flag, if the child holds a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_paths() {
        let user = UserId::parse("u1").unwrap();
        let place = Place::parse("Ramen").unwrap();

        assert_eq!(StorePath::place(&place).to_string(), "places/Ramen");
        assert_eq!(StorePath::availability(&user, &place).to_string(), "users/u1/Ramen");
        assert_eq!(StorePath::attendance(&user).to_string(), "going/u1");
    }

    #[test]
    fn parses_and_ignores_empty_segments() {
        let path: StorePath = "/users//u1/Ramen/".parse().unwrap();
        assert_eq!(path.segments(), ["users", "u1", "Ramen"]);
        assert!("".parse::<StorePath>().unwrap().is_root());
    }

    #[test]
    fn relative_to_strips_ancestor() {
        let path: StorePath = "users/u1/Ramen".parse().unwrap();
        assert_eq!(path.relative_to(&StorePath::users()), Some(&["u1".to_string(), "Ramen".to_string()][..]));
        assert_eq!(path.relative_to(&StorePath::places()), None);
    }

    #[test]
    fn attendance_collection_keeps_its_store_key() {
        assert_eq!(StorePath::collection(Collection::Attendance).to_string(), "going");
        assert_eq!("going".parse::<Collection>().unwrap(), Collection::Attendance);
    }

    #[test]
    fn change_kind_round_trips_through_strings() {
        assert_eq!(ChangeKind::Added.to_string(), "added");
        assert_eq!("CHANGED".parse::<ChangeKind>().unwrap(), ChangeKind::Changed);
        assert!("removed".parse::<ChangeKind>().is_err());
    }
}
