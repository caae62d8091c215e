//! Decoding of raw store subtrees into typed snapshots
//!
//! The store hands back untyped JSON. Keys that are not valid identifiers
//! and values that are not booleans are skipped with a warning rather than
//! failing the whole read: one malformed entry written by another client
//! must not block feasibility for everyone else.

use std::collections::BTreeMap;

use lunchsync_domain::{AvailabilitySnapshot, FeasibilityMap, Place, UserId};
use serde_json::{Map, Value};
use tracing::warn;

/// Children of an object node, or nothing for absent/scalar nodes.
fn children(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

fn flag(collection: &str, key: &str, value: &Value) -> Option<bool> {
    let flag = value.as_bool();
    if flag.is_none() {
        warn!(collection, key, value = %value, "Ignoring non-boolean store entry");
    }
    flag
}

fn parse_place(collection: &str, key: &str) -> Option<Place> {
    Place::parse(key)
        .map_err(|err| warn!(collection, key, error = %err, "Ignoring invalid place key"))
        .ok()
}

fn parse_user(collection: &str, key: &str) -> Option<UserId> {
    UserId::parse(key)
        .map_err(|err| warn!(collection, key, error = %err, "Ignoring invalid user key"))
        .ok()
}

/// Decode the `places` collection into the cached feasibility flags.
///
/// Every valid key is a known place; a non-boolean value keeps the place but
/// reports it as infeasible.
pub fn decode_places(value: Option<&Value>) -> FeasibilityMap {
    children(value)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let place = parse_place("places", key)?;
            Some((place, flag("places", key, value).unwrap_or(false)))
        })
        .collect()
}

/// Decode the `users` collection: user -> place -> available.
pub fn decode_availability(value: Option<&Value>) -> BTreeMap<UserId, BTreeMap<Place, bool>> {
    children(value)
        .into_iter()
        .flatten()
        .filter_map(|(user_key, places)| {
            let user = parse_user("users", user_key)?;
            let entries = children(Some(places))
                .into_iter()
                .flatten()
                .filter_map(|(place_key, value)| {
                    Some((parse_place("users", place_key)?, flag("users", place_key, value)?))
                })
                .collect();
            Some((user, entries))
        })
        .collect()
}

/// Decode the `going` collection: user -> attending.
pub fn decode_attendance(value: Option<&Value>) -> BTreeMap<UserId, bool> {
    children(value)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| Some((parse_user("going", key)?, flag("going", key, value)?)))
        .collect()
}

/// Assemble a snapshot from the three collection reads.
pub fn decode_snapshot(
    places: Option<&Value>,
    users: Option<&Value>,
    going: Option<&Value>,
) -> AvailabilitySnapshot {
    AvailabilitySnapshot {
        places: decode_places(places).into_iter().map(|(place, _)| place).collect(),
        availability: decode_availability(users),
        attendance: decode_attendance(going),
    }
}
