//! Integration tests for snapshot and store addressing types
//!
//! Covers the wire shapes the presentation layer and the store see.

use lunchsync_domain::{
    AvailabilitySnapshot, ChangeEvent, ChangeKind, FeasibilityMap, Place, StorePath, UserId,
};
use serde_json::json;

fn place(name: &str) -> Place {
    Place::parse(name).expect("valid place")
}

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

#[test]
fn feasibility_map_serializes_as_flat_object() {
    let map: FeasibilityMap = [(place("Tacos"), true), (place("Sushi"), false)].into_iter().collect();

    let value = serde_json::to_value(&map).expect("serializes");
    assert_eq!(value, json!({ "Sushi": false, "Tacos": true }));

    let back: FeasibilityMap = serde_json::from_value(value).expect("deserializes");
    assert_eq!(back, map);
}

#[test]
fn snapshot_answers_lunch_questions() {
    let snapshot = AvailabilitySnapshot::new()
        .with_place(place("A"))
        .with_place(place("B"))
        .with_availability(user("u1"), place("A"), true)
        .with_availability(user("u1"), place("B"), false)
        .with_attendance(user("u1"), true)
        .with_attendance(user("u2"), false);

    assert!(snapshot.is_attending(&user("u1")));
    assert!(!snapshot.is_attending(&user("u2")));
    assert!(!snapshot.is_attending(&user("nobody")));
    assert!(snapshot.is_available(&user("u1"), &place("A")));
    assert!(!snapshot.is_available(&user("u1"), &place("B")));
    assert_eq!(snapshot.attending_users().collect::<Vec<_>>(), vec![&user("u1")]);
}

#[test]
fn change_events_carry_child_values() {
    let event = ChangeEvent::new(ChangeKind::Changed, "u1", json!({ "A": true }));
    assert_eq!(event.as_bool(), None);

    let flag = ChangeEvent::new(ChangeKind::Added, "A", json!(false));
    assert_eq!(flag.as_bool(), Some(false));

    let json = serde_json::to_value(&flag).expect("serializes");
    assert_eq!(json["kind"], "added");
}

#[test]
fn user_paths_nest_under_users_collection() {
    let path = StorePath::availability(&user("u9"), &place("Deli"));
    assert_eq!(path.relative_to(&StorePath::user(&user("u9"))).map(<[String]>::len), Some(1));
    assert_eq!(path.to_string().parse::<StorePath>().expect("parses"), path);
}
