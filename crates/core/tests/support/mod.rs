//! Shared test helpers for `lunchsync-core` integration tests.
//!
//! In-memory fakes for every core port so that coordinator tests can focus
//! on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod session;
pub mod store;

use lunchsync_domain::{Place, UserId, UserIdentity};

pub fn place(name: &str) -> Place {
    Place::parse(name).expect("valid place name")
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

pub fn identity(id: &str) -> UserIdentity {
    UserIdentity::new(user(id))
}
