//! Port interfaces for identity and presentation
//!
//! The presentation layer (sign-in UI, place list, results list) lives
//! outside this crate. It supplies the signed-in identity and receives
//! display callbacks through these traits.

use lunchsync_domain::{Place, UserIdentity};

/// Trait for reading the currently signed-in user
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for an anonymous caller
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Trait for pushing state changes to the presentation layer
///
/// Callbacks run on the caller's task and must not block.
pub trait PresentationSink: Send + Sync {
    /// A place's feasibility flag was written to the store
    fn feasibility_changed(&self, place: &Place, feasible: bool);

    /// The signed-in user's attendance flag changed
    fn attendance_changed(&self, going: bool);

    /// A place appeared in (or changed within) the signed-in user's
    /// availability list
    fn place_listed(&self, place: &Place, available: bool);

    /// A mutation was attempted while signed out
    fn sign_in_required(&self);
}
